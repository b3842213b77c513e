// ==========================================
// 联赛排程与积分榜引擎 - 赛程落库器
// ==========================================
// 职责: 把配对结果转成带日期、轮次的比赛记录并幂等落库
// 输入: 赛季 ID + 有序选手列表 + 操作身份
// 输出: MaterializationSummary（提交的写入条数等）
// ==========================================
// 红线: 校验在任何 I/O 之前完成
// 红线: 同一赛季在进程内串行化,守卫检查在持锁期间进行
// 红线: 赛程标记必须是最后一次写入;中途失败时赛季保持未标记
// ==========================================

use crate::config::LeagueConfigReader;
use crate::domain::{
    ActingIdentity, LeagueMatch, PlayerId, ScheduleMarker, Season, SeasonPlayer,
    MAX_ROUND_LENGTH_DAYS,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::events::{
    LeagueEvent, LeagueEventPublisher, LeagueEventType, OptionalEventPublisher,
};
use crate::engine::pairing::{PairingGenerator, Round};
use crate::repository::error::RepositoryError;
use crate::repository::league_store::{BatchWrite, LeagueStore};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

// ==========================================
// MaterializationSummary - 落库结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializationSummary {
    pub season_id: String,
    pub rounds: usize,
    pub matches_written: usize,
    pub members_written: usize,
    pub batches: usize,
}

impl MaterializationSummary {
    /// 提交的写入条数（不含赛程标记）
    pub fn committed_writes(&self) -> usize {
        self.matches_written + self.members_written
    }
}

// ==========================================
// FixtureMaterializer - 赛程落库器
// ==========================================
pub struct FixtureMaterializer<S, C>
where
    S: LeagueStore,
    C: LeagueConfigReader,
{
    store: Arc<S>,
    config: Arc<C>,
    pairing: PairingGenerator,
    // 赛季级进程内锁
    season_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    event_publisher: OptionalEventPublisher,
}

impl<S, C> FixtureMaterializer<S, C>
where
    S: LeagueStore,
    C: LeagueConfigReader,
{
    /// 创建新的 FixtureMaterializer 实例
    pub fn new(
        store: Arc<S>,
        config: Arc<C>,
        event_publisher: Option<Arc<dyn LeagueEventPublisher>>,
    ) -> Self {
        Self {
            store,
            config,
            pairing: PairingGenerator::new(),
            season_locks: Mutex::new(HashMap::new()),
            event_publisher: OptionalEventPublisher::from_option(event_publisher),
        }
    }

    /// 生成并落库赛季赛程
    ///
    /// # 流程
    /// 1) 权限与名单校验（无 I/O）
    /// 2) 获取赛季锁,读取赛季并检查幂等守卫
    /// 3) 补齐缺失的赛季成员,按批次写入成员与比赛
    /// 4) 最后写入赛程标记,发布 ScheduleGenerated 事件
    ///
    /// # 返回
    /// - Err(NotAuthorized): 非管理员
    /// - Err(InvalidRoster): 名单不合法（零次存储调用）
    /// - Err(AlreadyGenerated): 赛季已有比赛或已标记
    /// - Err(StoreUnavailable): 存储失败,已提交的批次保留,赛季不标记
    #[instrument(skip(self, player_ids, actor), fields(
        season_id = %season_id,
        roster_size = player_ids.len(),
        actor = %actor.player_id
    ))]
    pub async fn materialize(
        &self,
        season_id: &str,
        player_ids: &[PlayerId],
        actor: &ActingIdentity,
    ) -> EngineResult<MaterializationSummary> {
        // ===== 1. 校验（无 I/O） =====
        if !actor.is_admin {
            return Err(EngineError::NotAuthorized {
                actor: actor.player_id.to_string(),
                action: "生成赛程".to_string(),
            });
        }
        let rounds = self.pairing.generate_rounds(player_ids)?;

        // ===== 2. 赛季锁 =====
        let season_lock = self.season_lock(season_id)?;
        let outcome = {
            let _guard = season_lock.lock().await;
            self.materialize_locked(season_id, player_ids, actor, &rounds).await
        };
        self.release_season_lock(season_id, season_lock);
        outcome
    }

    /// 持有赛季锁期间执行: 守卫检查、写入、提交标记
    async fn materialize_locked(
        &self,
        season_id: &str,
        player_ids: &[PlayerId],
        actor: &ActingIdentity,
        rounds: &[Round],
    ) -> EngineResult<MaterializationSummary> {
        let season = self
            .store
            .get_season(season_id)
            .await?
            .ok_or_else(|| EngineError::SeasonNotFound(season_id.to_string()))?;

        if !season.has_valid_round_length() {
            return Err(EngineError::InvalidSeason(format!(
                "赛季 {} 的轮次间隔 {} 天不在 1..={} 之内",
                season_id, season.round_length_days, MAX_ROUND_LENGTH_DAYS
            )));
        }

        if season.schedule_generated {
            warn!(season_id = %season_id, "赛季已标记为生成赛程，拒绝重复生成");
            return Err(EngineError::AlreadyGenerated {
                season_id: season_id.to_string(),
            });
        }

        let existing = self.store.query_matches(season_id, Some(1)).await?;
        if !existing.is_empty() {
            warn!(season_id = %season_id, "赛季已存在比赛记录，拒绝重复生成");
            return Err(EngineError::AlreadyGenerated {
                season_id: season_id.to_string(),
            });
        }

        // ===== 3. 组装写入 =====
        let now = chrono::Local::now().naive_local();
        let members: HashSet<PlayerId> = self
            .store
            .query_season_players(season_id)
            .await?
            .into_iter()
            .map(|m| m.player_id)
            .collect();

        let mut writes: Vec<BatchWrite> = player_ids
            .iter()
            .filter(|id| !members.contains(*id))
            .map(|id| {
                BatchWrite::SeasonPlayer(SeasonPlayer {
                    season_id: season_id.to_string(),
                    player_id: id.clone(),
                    joined_at: now,
                })
            })
            .collect();
        let members_written = writes.len();

        let fixtures = build_fixtures(&season, rounds)?;
        let matches_written = fixtures.len();
        writes.extend(fixtures.into_iter().map(BatchWrite::Match));

        // ===== 4. 分批提交 =====
        let batch_size = self.config.get_max_batch_size().await?.max(1);
        let total_batches = writes.len().div_ceil(batch_size);
        let mut committed = 0usize;
        let mut batches = 0usize;
        let mut pending = writes.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<BatchWrite> = pending.by_ref().take(batch_size).collect();
            let batch_len = batch.len();
            let collection = batch.first().map(BatchWrite::collection).unwrap_or("-");
            match self.store.batch_write(batch).await {
                Ok(written) => {
                    committed += written;
                    batches += 1;
                    debug!(
                        season_id = %season_id,
                        batch = batches,
                        total_batches = total_batches,
                        written = written,
                        "赛程批次已提交"
                    );
                }
                Err(e) => {
                    warn!(
                        season_id = %season_id,
                        failed_batch = batches + 1,
                        batch_len = batch_len,
                        collection = collection,
                        committed = committed,
                        error = %e,
                        "赛程批次写入失败，赛季保持未标记"
                    );
                    return Err(EngineError::StoreUnavailable(e));
                }
            }
        }

        // ===== 5. 提交标记（最后一次写入） =====
        let marker = ScheduleMarker {
            generated_at: chrono::Local::now().naive_local(),
            generated_by: actor.player_id.to_string(),
            roster_size: player_ids.len() as u32,
        };
        self.store.update_season(season_id, &marker).await?;

        let summary = MaterializationSummary {
            season_id: season_id.to_string(),
            rounds: rounds.len(),
            matches_written,
            members_written,
            batches,
        };

        info!(
            season_id = %season_id,
            rounds = summary.rounds,
            matches = summary.matches_written,
            members = summary.members_written,
            committed = summary.committed_writes(),
            batches = summary.batches,
            "赛程生成完成"
        );

        self.event_publisher.publish_or_log(LeagueEvent::season_scope(
            season_id.to_string(),
            LeagueEventType::ScheduleGenerated,
            Some("FixtureMaterializer".to_string()),
        ));

        Ok(summary)
    }

    /// 获取（或创建）赛季锁
    fn season_lock(&self, season_id: &str) -> EngineResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .season_locks
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(locks
            .entry(season_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    /// 释放赛季锁: 没有其他等待者时从映射表移除
    fn release_season_lock(&self, season_id: &str, season_lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = match self.season_locks.lock() {
            Ok(locks) => locks,
            Err(e) => {
                warn!(season_id = %season_id, error = %e, "赛季锁映射表不可用，跳过清理");
                return;
            }
        };
        // 映射表 + 当前持有者 = 2
        let is_current = locks
            .get(season_id)
            .is_some_and(|held| Arc::ptr_eq(held, &season_lock));
        if is_current && Arc::strong_count(&season_lock) == 2 {
            locks.remove(season_id);
        }
    }

    #[cfg(test)]
    fn tracked_season_locks(&self) -> usize {
        self.season_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

/// 把轮次展开为未完成的比赛记录（不落库）
///
/// 日期: start_date + (round_number - 1) × round_length_days
///
/// # 返回
/// - Err(InvalidSeason): 某一轮日期超出可表示范围
pub fn build_fixtures(season: &Season, rounds: &[Round]) -> EngineResult<Vec<LeagueMatch>> {
    let mut fixtures = Vec::new();
    for round in rounds {
        let scheduled_date = season.round_date(round.round_number).ok_or_else(|| {
            EngineError::InvalidSeason(format!(
                "赛季 {} 第 {} 轮的日期超出范围 (start_date={}, round_length_days={})",
                season.season_id, round.round_number, season.start_date, season.round_length_days
            ))
        })?;
        fixtures.extend(round.pairings.iter().map(|pairing| {
            LeagueMatch::scheduled(
                season.season_id.clone(),
                round.round_number,
                round.leg,
                pairing.home.clone(),
                pairing.away.clone(),
                scheduled_date,
            )
        }));
    }
    Ok(fixtures)
}
