// ==========================================
// 联赛排程与积分榜引擎 - 赛果录入器
// ==========================================
// 职责: 校验并写入单场比赛结果,按固定积分表派生积分
// 输入: 比赛 ID + 主/客局数 + 操作身份
// 输出: 更新后的比赛
// ==========================================
// 红线: 比分校验在任何 I/O 之前完成
// 红线: 权限以存储中的比赛为准,写入前重新校验
// ==========================================

use crate::config::LeagueConfigReader;
use crate::domain::{ActingIdentity, LeagueMatch, MatchOutcome, MatchResult};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::events::{
    LeagueEvent, LeagueEventPublisher, LeagueEventType, OptionalEventPublisher,
};
use crate::repository::error::RepositoryError;
use crate::repository::league_store::LeagueStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// ResultRecorder - 赛果录入器
// ==========================================
pub struct ResultRecorder<S, C>
where
    S: LeagueStore,
    C: LeagueConfigReader,
{
    store: Arc<S>,
    config: Arc<C>,
    event_publisher: OptionalEventPublisher,
}

impl<S, C> ResultRecorder<S, C>
where
    S: LeagueStore,
    C: LeagueConfigReader,
{
    pub fn new(
        store: Arc<S>,
        config: Arc<C>,
        event_publisher: Option<Arc<dyn LeagueEventPublisher>>,
    ) -> Self {
        Self {
            store,
            config,
            event_publisher: OptionalEventPublisher::from_option(event_publisher),
        }
    }

    /// 录入比赛结果
    ///
    /// 已完成的比赛再次录入视为更正（覆盖旧结果）
    ///
    /// # 返回
    /// - Err(InvalidResult): 比分不是 2:0/2:1/1:2/0:2
    /// - Err(MatchNotFound): 比赛不存在
    /// - Err(NotAuthorized): 既不是管理员也不是参赛方
    /// - Err(ResultAlreadyRecorded): 已有结果且配置禁止更正
    #[instrument(skip(self, actor), fields(match_id = %match_id, actor = %actor.player_id))]
    pub async fn record_result(
        &self,
        match_id: &str,
        home_games: i32,
        away_games: i32,
        actor: &ActingIdentity,
    ) -> EngineResult<LeagueMatch> {
        let outcome = MatchOutcome::from_games(home_games, away_games).ok_or(
            EngineError::InvalidResult {
                home_games,
                away_games,
            },
        )?;

        let mut league_match = self
            .store
            .get_match(match_id)
            .await?
            .ok_or_else(|| EngineError::MatchNotFound(match_id.to_string()))?;

        if !actor.is_admin && !league_match.is_participant(&actor.player_id) {
            return Err(EngineError::NotAuthorized {
                actor: actor.player_id.to_string(),
                action: format!("录入比赛 {} 的结果", match_id),
            });
        }

        if let Some(previous) = &league_match.result {
            if !self.config.get_allow_result_correction().await? {
                return Err(EngineError::ResultAlreadyRecorded {
                    match_id: match_id.to_string(),
                    existing: previous.score_label(),
                });
            }
            warn!(
                match_id = %match_id,
                previous_score = %previous.score_label(),
                previous_recorded_by = %previous.recorded_by,
                new_score = %format!("{}:{}", home_games, away_games),
                "更正已录入的比赛结果"
            );
        }

        let result = MatchResult::from_outcome(
            outcome,
            chrono::Local::now().naive_local(),
            actor.player_id.as_str(),
        );

        self.store
            .update_match(match_id, &result)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound { .. } => EngineError::MatchNotFound(match_id.to_string()),
                other => EngineError::StoreUnavailable(other),
            })?;

        league_match.apply_result(result);

        info!(
            match_id = %match_id,
            season_id = %league_match.season_id,
            round = league_match.round_number,
            score = %format!("{}:{}", home_games, away_games),
            "比赛结果已录入"
        );

        self.event_publisher.publish_or_log(LeagueEvent::match_scope(
            league_match.season_id.clone(),
            match_id.to_string(),
            LeagueEventType::MatchResultRecorded,
            Some("ResultRecorder".to_string()),
        ));

        Ok(league_match)
    }
}
