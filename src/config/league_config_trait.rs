// ==========================================
// 联赛排程与积分榜引擎 - 联赛配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// LeagueConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait LeagueConfigReader: Send + Sync {
    /// 新建赛季时的默认轮次间隔（天）
    ///
    /// # 默认值
    /// - 14
    async fn get_default_round_length_days(&self) -> RepositoryResult<u32>;

    /// 单批次最大写入条数（存储事务上限）
    ///
    /// # 默认值
    /// - 400（最小 1）
    async fn get_max_batch_size(&self) -> RepositoryResult<usize>;

    /// 是否允许覆盖已录入的赛果（更正）
    ///
    /// # 默认值
    /// - true
    async fn get_allow_result_correction(&self) -> RepositoryResult<bool>;

    /// 未命名赛季的名称前缀
    ///
    /// # 默认值
    /// - "Season"
    async fn get_season_name_prefix(&self) -> RepositoryResult<String>;
}
