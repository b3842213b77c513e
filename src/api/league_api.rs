// ==========================================
// 联赛排程与积分榜引擎 - 联赛 API
// ==========================================
// 职责: 赛季管理、赛程生成、赛果录入、积分榜查询
// 说明: 做输入校验与错误映射,业务规则全部委托给引擎
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, LeagueConfigReader};
use crate::domain::{
    ActingIdentity, LeagueMatch, PlayerId, Season, StandingsRow, MAX_ROUND_LENGTH_DAYS,
};
use crate::engine::{
    aggregate, FixtureMaterializer, LeagueEventPublisher, MaterializationSummary, ResultRecorder,
    StandingsAggregator,
};
use crate::repository::league_store::LeagueStore;
use crate::repository::league_store_impl::LeagueStoreImpl;

// ==========================================
// 请求/响应结构
// ==========================================

/// 新建赛季请求（缺省字段使用配置默认值）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSeasonRequest {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub round_length_days: Option<u32>,
}

/// 赛季概览: 赛季 + 比赛列表 + 积分榜
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonOverview {
    pub season: Season,
    pub matches: Vec<LeagueMatch>,
    pub standings: Vec<StandingsRow>,
}

// ==========================================
// LeagueApi - 联赛 API
// ==========================================

/// 联赛API
///
/// 职责：
/// 1. 赛季创建与查询
/// 2. 赛程生成（管理员）
/// 3. 赛果录入（管理员或参赛方）
/// 4. 积分榜与赛季概览
pub struct LeagueApi {
    store: Arc<LeagueStoreImpl>,
    config: Arc<ConfigManager>,
    materializer: FixtureMaterializer<LeagueStoreImpl, ConfigManager>,
    recorder: ResultRecorder<LeagueStoreImpl, ConfigManager>,
    aggregator: StandingsAggregator<LeagueStoreImpl>,
}

impl LeagueApi {
    /// 创建新的LeagueApi实例
    pub fn new(
        store: Arc<LeagueStoreImpl>,
        config: Arc<ConfigManager>,
        event_publisher: Option<Arc<dyn LeagueEventPublisher>>,
    ) -> Self {
        Self {
            materializer: FixtureMaterializer::new(
                store.clone(),
                config.clone(),
                event_publisher.clone(),
            ),
            recorder: ResultRecorder::new(store.clone(), config.clone(), event_publisher),
            aggregator: StandingsAggregator::new(store.clone()),
            store,
            config,
        }
    }

    // ==========================================
    // 赛季
    // ==========================================

    /// 新建赛季
    ///
    /// # 默认值
    /// - name: "{season_name_prefix} YYYY-MM-DD"（当天日期）
    /// - start_date: 当天
    /// - round_length_days: default_round_length_days 配置
    pub async fn create_season(
        &self,
        request: CreateSeasonRequest,
        actor: &ActingIdentity,
    ) -> ApiResult<Season> {
        if !actor.is_admin {
            return Err(ApiError::PermissionDenied(format!(
                "{} 不是管理员，不能创建赛季",
                actor.player_id
            )));
        }

        let round_length_days = match request.round_length_days {
            Some(days) if !(1..=MAX_ROUND_LENGTH_DAYS).contains(&days) => {
                return Err(ApiError::ValidationError(format!(
                    "轮次间隔必须在 1..={} 天之内，实际为 {}",
                    MAX_ROUND_LENGTH_DAYS, days
                )))
            }
            Some(days) => days,
            None => self.config.get_default_round_length_days().await?,
        };

        let now = chrono::Local::now().naive_local();
        let today = now.date();

        let name = match request.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!(
                "{} {}",
                self.config.get_season_name_prefix().await?,
                today.format("%Y-%m-%d")
            ),
        };

        let season = Season::new(
            name,
            request.start_date.unwrap_or(today),
            round_length_days,
            now,
        );
        self.store.insert_season(&season).await?;

        tracing::info!(
            season_id = %season.season_id,
            name = %season.name,
            start_date = %season.start_date,
            round_length_days = season.round_length_days,
            "赛季已创建"
        );
        Ok(season)
    }

    /// 查询赛季（不存在返回 NotFound）
    pub async fn get_season(&self, season_id: &str) -> ApiResult<Season> {
        require_id(season_id, "赛季ID")?;
        self.store
            .get_season(season_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("赛季(id={})不存在", season_id)))
    }

    /// 赛季列表（最新在前）
    pub async fn list_seasons(&self, limit: Option<usize>) -> ApiResult<Vec<Season>> {
        Ok(self.store.list_seasons(limit).await?)
    }

    /// 最新创建的赛季
    pub async fn latest_season(&self) -> ApiResult<Option<Season>> {
        Ok(self.store.list_seasons(Some(1)).await?.into_iter().next())
    }

    // ==========================================
    // 赛程
    // ==========================================

    /// 生成赛程（仅管理员,每赛季一次）
    ///
    /// 选手ID原样透传,不做格式校验（空串也是合法ID）
    pub async fn generate_schedule(
        &self,
        season_id: &str,
        player_ids: &[PlayerId],
        actor: &ActingIdentity,
    ) -> ApiResult<MaterializationSummary> {
        require_id(season_id, "赛季ID")?;

        Ok(self
            .materializer
            .materialize(season_id, player_ids, actor)
            .await?)
    }

    /// 赛季比赛列表（按轮次升序）
    pub async fn list_matches(&self, season_id: &str) -> ApiResult<Vec<LeagueMatch>> {
        require_id(season_id, "赛季ID")?;
        Ok(self.store.query_matches(season_id, None).await?)
    }

    /// 某选手在赛季中的比赛
    pub async fn list_player_matches(
        &self,
        season_id: &str,
        player_id: &PlayerId,
    ) -> ApiResult<Vec<LeagueMatch>> {
        let matches = self.list_matches(season_id).await?;
        Ok(matches
            .into_iter()
            .filter(|m| m.is_participant(player_id))
            .collect())
    }

    // ==========================================
    // 赛果
    // ==========================================

    /// 录入比赛结果
    pub async fn record_result(
        &self,
        match_id: &str,
        home_games: i32,
        away_games: i32,
        actor: &ActingIdentity,
    ) -> ApiResult<LeagueMatch> {
        require_id(match_id, "比赛ID")?;
        Ok(self
            .recorder
            .record_result(match_id, home_games, away_games, actor)
            .await?)
    }

    /// 以比分文本录入比赛结果,形如 "2:1"
    pub async fn record_result_text(
        &self,
        match_id: &str,
        score: &str,
        actor: &ActingIdentity,
    ) -> ApiResult<LeagueMatch> {
        let (home_games, away_games) = parse_score(score)?;
        self.record_result(match_id, home_games, away_games, actor)
            .await
    }

    // ==========================================
    // 积分榜
    // ==========================================

    /// 赛季积分榜
    pub async fn standings(&self, season_id: &str) -> ApiResult<Vec<StandingsRow>> {
        require_id(season_id, "赛季ID")?;
        Ok(self.aggregator.compute_standings(season_id).await?)
    }

    /// 最新赛季概览（无赛季时返回 None）
    pub async fn latest_season_overview(&self) -> ApiResult<Option<SeasonOverview>> {
        let Some(season) = self.latest_season().await? else {
            return Ok(None);
        };

        let matches = self.store.query_matches(&season.season_id, None).await?;
        let standings = aggregate(&matches);
        Ok(Some(SeasonOverview {
            season,
            matches,
            standings,
        }))
    }
}

fn require_id(value: &str, label: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", label)));
    }
    Ok(())
}

/// 解析比分文本 "主:客"
///
/// 只做格式解析,是否为合法赛果由引擎判定
pub fn parse_score(score: &str) -> ApiResult<(i32, i32)> {
    let invalid = || ApiError::InvalidInput(format!("比分格式无效: '{}'（应为 主:客，例如 2:1）", score));

    let mut parts = score.split(':');
    let (Some(home), Some(away), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let home = home.trim().parse::<i32>().map_err(|_| invalid())?;
    let away = away.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok((home, away))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("2:1").unwrap(), (2, 1));
        assert_eq!(parse_score(" 0 : 2 ").unwrap(), (0, 2));
        // 格式合法但结果非法,交给引擎判定
        assert_eq!(parse_score("1:1").unwrap(), (1, 1));

        for bad in ["", "2", "2:1:0", "a:b", "2-1"] {
            assert!(
                matches!(parse_score(bad), Err(ApiError::InvalidInput(_))),
                "应拒绝 {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_require_id() {
        assert!(require_id("S1", "赛季ID").is_ok());
        assert!(matches!(require_id("  ", "赛季ID"), Err(ApiError::InvalidInput(_))));
    }
}
