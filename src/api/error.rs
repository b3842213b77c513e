// ==========================================
// 联赛排程与积分榜引擎 - API层错误类型
// ==========================================
// 职责: 把 Engine/Repository 错误转换为用户友好的错误消息
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("权限不足: {0}")]
    PermissionDenied(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRoster(_)
            | EngineError::InvalidResult { .. }
            | EngineError::InvalidSeason(_) => ApiError::ValidationError(err.to_string()),
            EngineError::NotAuthorized { .. } => ApiError::PermissionDenied(err.to_string()),
            EngineError::AlreadyGenerated { .. } | EngineError::ResultAlreadyRecorded { .. } => {
                ApiError::BusinessRuleViolation(err.to_string())
            }
            EngineError::SeasonNotFound(_) | EngineError::MatchNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            EngineError::StoreUnavailable(repo_err) => ApiError::from(repo_err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err: ApiError = EngineError::InvalidResult {
            home_games: 1,
            away_games: 1,
        }
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert!(err.to_string().contains("1:1"));

        let err: ApiError = EngineError::AlreadyGenerated {
            season_id: "S1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        let err: ApiError = EngineError::NotAuthorized {
            actor: "P9".to_string(),
            action: "生成赛程".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::PermissionDenied(_)));

        let err: ApiError = EngineError::MatchNotFound("M1".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_store_error_passes_through_repository_mapping() {
        let err: ApiError =
            EngineError::StoreUnavailable(RepositoryError::LockError("poisoned".to_string())).into();
        match err {
            ApiError::DatabaseConnectionError(msg) => assert!(msg.contains("poisoned")),
            other => panic!("Expected DatabaseConnectionError, got {:?}", other),
        }
    }
}
