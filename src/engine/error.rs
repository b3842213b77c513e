// ==========================================
// 联赛排程与积分榜引擎 - 引擎层错误类型
// ==========================================
// 职责: 赛程生成、赛果录入、积分榜计算的错误分类
// 约束: 校验类错误必须在任何 I/O 之前抛出
// 约束: 存储错误一律向上传播,不吞掉、不自动重试
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入校验错误 =====
    #[error("参赛名单无效: {0}")]
    InvalidRoster(String),

    #[error("比赛结果无效: {home_games}:{away_games}（仅允许 2:0、2:1、1:2、0:2）")]
    InvalidResult { home_games: i32, away_games: i32 },

    #[error("赛季参数无效: {0}")]
    InvalidSeason(String),

    // ===== 权限错误 =====
    #[error("无权限: {actor} 不能{action}")]
    NotAuthorized { actor: String, action: String },

    // ===== 业务状态错误 =====
    #[error("赛季 {season_id} 的赛程已生成，不可重复生成")]
    AlreadyGenerated { season_id: String },

    #[error("比赛 {match_id} 已录入结果 {existing}，当前配置不允许更正")]
    ResultAlreadyRecorded { match_id: String, existing: String },

    #[error("赛季不存在: {0}")]
    SeasonNotFound(String),

    #[error("比赛不存在: {0}")]
    MatchNotFound(String),

    // ===== 存储错误 =====
    #[error("存储不可用: {0}")]
    StoreUnavailable(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
