// ==========================================
// 联赛排程与积分榜引擎 - 联赛存储 Trait
// ==========================================
// 职责: 定义引擎访问外部文档存储的最小接口（不包含业务逻辑）
// 红线: Store 不含业务规则,只做数据读写
// ==========================================

use crate::domain::{LeagueMatch, MatchResult, ScheduleMarker, Season, SeasonPlayer};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// BatchWrite - 批量写入项
// ==========================================
// 一个批次内的写入要么全部提交,要么全部回滚
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    SeasonPlayer(SeasonPlayer),
    Match(LeagueMatch),
}

impl BatchWrite {
    /// 目标集合名（用于日志）
    pub fn collection(&self) -> &'static str {
        match self {
            BatchWrite::SeasonPlayer(_) => "season_player",
            BatchWrite::Match(_) => "league_match",
        }
    }
}

// ==========================================
// LeagueStore Trait
// ==========================================
// 用途: 赛程生成、赛果录入、积分榜计算所需的数据访问
// 实现者: LeagueStoreImpl（使用 rusqlite）
#[async_trait]
pub trait LeagueStore: Send + Sync {
    // ===== 比赛 =====

    /// 查询赛季下的比赛（按轮次升序,同轮按写入顺序）
    ///
    /// # 参数
    /// - season_id: 赛季 ID
    /// - limit: 最大返回条数（None 表示全部;幂等检查时传 Some(1)）
    async fn query_matches(
        &self,
        season_id: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<LeagueMatch>>;

    /// 按 ID 查询单场比赛
    async fn get_match(&self, match_id: &str) -> RepositoryResult<Option<LeagueMatch>>;

    /// 写入比赛结果（单文档更新）
    ///
    /// # 返回
    /// - Err(NotFound): 比赛不存在
    async fn update_match(&self, match_id: &str, result: &MatchResult) -> RepositoryResult<()>;

    // ===== 赛季成员 =====

    /// 查询赛季成员
    async fn query_season_players(&self, season_id: &str) -> RepositoryResult<Vec<SeasonPlayer>>;

    // ===== 批量写入 =====

    /// 原子批量写入
    ///
    /// # 返回
    /// - Ok(usize): 提交的写入条数
    /// - Err: 整个批次回滚
    async fn batch_write(&self, writes: Vec<BatchWrite>) -> RepositoryResult<usize>;

    // ===== 赛季 =====

    /// 新建赛季
    async fn insert_season(&self, season: &Season) -> RepositoryResult<()>;

    /// 按 ID 查询赛季
    async fn get_season(&self, season_id: &str) -> RepositoryResult<Option<Season>>;

    /// 查询赛季列表（按创建时间倒序）
    async fn list_seasons(&self, limit: Option<usize>) -> RepositoryResult<Vec<Season>>;

    /// 写入赛程提交标记（单文档更新）
    ///
    /// # 返回
    /// - Err(NotFound): 赛季不存在
    async fn update_season(&self, season_id: &str, marker: &ScheduleMarker) -> RepositoryResult<()>;
}
