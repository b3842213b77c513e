// ==========================================
// 联赛排程与积分榜引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::LeagueApi;
use crate::config::config_manager::ConfigManager;
use crate::db::open_and_migrate;
use crate::engine::LeagueEventPublisher;
use crate::repository::error::RepositoryResult;
use crate::repository::league_store_impl::LeagueStoreImpl;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 联赛API
    pub league_api: Arc<LeagueApi>,

    /// 配置管理器（用于读写 config_kv）
    pub config_manager: Arc<ConfigManager>,

    /// 联赛存储
    pub league_store: Arc<LeagueStoreImpl>,

    /// 事件发布器（赛程提交、赛果录入后通知宿主）
    pub event_publisher: Option<Arc<dyn LeagueEventPublisher>>,
}

impl AppState {
    /// 创建新的AppState实例（不发布事件）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        Self::with_event_publisher(db_path, None)
    }

    /// 创建带事件发布器的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（共享连接）
    /// 2. 初始化存储与配置管理器
    /// 3. 创建联赛API
    pub fn with_event_publisher(
        db_path: String,
        event_publisher: Option<Arc<dyn LeagueEventPublisher>>,
    ) -> RepositoryResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_and_migrate(&db_path)?;
        let conn = Arc::new(Mutex::new(conn));

        let league_store = Arc::new(LeagueStoreImpl::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        let league_api = Arc::new(LeagueApi::new(
            league_store.clone(),
            config_manager.clone(),
            event_publisher.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            league_api,
            config_manager,
            league_store,
            event_publisher,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 LEAGUE_ENGINE_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("LEAGUE_ENGINE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./league_engine.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染正式数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("league-engine-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("league-engine");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("league_engine.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_wires_shared_connection() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert!(state.event_publisher.is_none());

        // 配置写入对 API 立即可见（同一连接）
        state
            .config_manager
            .set_global_config_value("season_name_prefix", "Liga")
            .unwrap();
        let season = state
            .league_api
            .create_season(Default::default(), &crate::domain::ActingIdentity::admin("root"))
            .await
            .unwrap();
        assert!(season.name.starts_with("Liga "));
    }
}
