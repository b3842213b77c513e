// ==========================================
// 联赛排程与积分榜引擎 - 引擎层
// ==========================================
// 职责: 实现赛程与积分规则,不拼 SQL
// 红线: Engine 只通过 LeagueStore 访问存储
// ==========================================

pub mod error;
pub mod events;
pub mod fixture;
pub mod pairing;
pub mod result_recorder;
pub mod standings;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use events::{LeagueEvent, LeagueEventPublisher, LeagueEventType, OptionalEventPublisher};
pub use fixture::{build_fixtures, FixtureMaterializer, MaterializationSummary};
pub use pairing::{Pairing, PairingGenerator, Round};
pub use result_recorder::ResultRecorder;
pub use standings::{aggregate, compare_rows, StandingsAggregator};
