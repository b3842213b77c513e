// ==========================================
// 联赛排程与积分榜引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供宿主应用调用
// ==========================================

pub mod error;
pub mod league_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use league_api::{parse_score, CreateSeasonRequest, LeagueApi, SeasonOverview};
