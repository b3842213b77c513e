// ==========================================
// 联赛排程与积分榜引擎 - 核心库
// ==========================================
// 功能: 双循环赛程生成、幂等落库、赛果录入、积分排名
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ActingIdentity, LeagueMatch, Leg, MatchOutcome, MatchResult, PlayerId, ScheduleMarker,
    Season, SeasonPlayer, SeasonStatus, Seat, StandingsRow, MAX_ROUND_LENGTH_DAYS,
};

// 引擎
pub use engine::{
    EngineError, EngineResult, FixtureMaterializer, MaterializationSummary, PairingGenerator,
    ResultRecorder, Round, StandingsAggregator,
};

// 仓储
pub use repository::{LeagueStore, LeagueStoreImpl, RepositoryError, RepositoryResult};

// API
pub use api::{ApiError, ApiResult, LeagueApi};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const SYSTEM_NAME: &str = "联赛排程与积分榜引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
