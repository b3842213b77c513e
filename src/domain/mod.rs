// ==========================================
// 联赛排程与积分榜引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod league_match;
pub mod season;
pub mod standings;
pub mod types;

// 重导出核心类型
pub use league_match::{LeagueMatch, MatchOutcome, MatchResult};
pub use season::{ScheduleMarker, Season, SeasonPlayer, MAX_ROUND_LENGTH_DAYS};
pub use standings::StandingsRow;
pub use types::{ActingIdentity, Leg, PlayerId, Seat, SeasonStatus};
