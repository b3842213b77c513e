// ==========================================
// 联赛排程与积分榜引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::league_config_trait::LeagueConfigReader;
use crate::db::open_and_migrate;
use crate::domain::MAX_ROUND_LENGTH_DAYS;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_migrate(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_global_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::InternalError(e.to_string()))
    }

    /// 解析数值配置,非法值回退默认值并告警
    fn parse_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: std::str::FromStr + std::fmt::Display + Copy,
    {
        let raw = self.get_config_or_default(key, &default.to_string())?;
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// LeagueConfigReader Trait 实现
// ==========================================
#[async_trait]
impl LeagueConfigReader for ConfigManager {
    async fn get_default_round_length_days(&self) -> RepositoryResult<u32> {
        let days = self.parse_or_default(config_keys::DEFAULT_ROUND_LENGTH_DAYS, defaults::ROUND_LENGTH_DAYS)?;
        Ok(days.clamp(1, MAX_ROUND_LENGTH_DAYS))
    }

    async fn get_max_batch_size(&self) -> RepositoryResult<usize> {
        let size = self.parse_or_default(config_keys::MAX_BATCH_SIZE, defaults::MAX_BATCH_SIZE)?;
        Ok(size.max(1))
    }

    async fn get_allow_result_correction(&self) -> RepositoryResult<bool> {
        let raw = self.get_config_or_default(config_keys::ALLOW_RESULT_CORRECTION, "true")?;
        match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => {
                tracing::warn!(
                    config_key = config_keys::ALLOW_RESULT_CORRECTION,
                    raw_value = %raw,
                    "配置格式错误，使用默认值 true"
                );
                Ok(true)
            }
        }
    }

    async fn get_season_name_prefix(&self) -> RepositoryResult<String> {
        let prefix = self.get_config_or_default(config_keys::SEASON_NAME_PREFIX, defaults::SEASON_NAME_PREFIX)?;
        let prefix = prefix.trim();
        if prefix.is_empty() {
            Ok(defaults::SEASON_NAME_PREFIX.to_string())
        } else {
            Ok(prefix.to_string())
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEFAULT_ROUND_LENGTH_DAYS: &str = "default_round_length_days";
    pub const MAX_BATCH_SIZE: &str = "max_batch_size";
    pub const ALLOW_RESULT_CORRECTION: &str = "allow_result_correction";
    pub const SEASON_NAME_PREFIX: &str = "season_name_prefix";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const ROUND_LENGTH_DAYS: u32 = 14;
    // 文档存储单事务上限通常为 500,留出余量
    pub const MAX_BATCH_SIZE: usize = 400;
    pub const SEASON_NAME_PREFIX: &str = "Season";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn memory_config() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = memory_config();
        assert_eq!(config.get_default_round_length_days().await.unwrap(), 14);
        assert_eq!(config.get_max_batch_size().await.unwrap(), 400);
        assert!(config.get_allow_result_correction().await.unwrap());
        assert_eq!(config.get_season_name_prefix().await.unwrap(), "Season");
    }

    #[tokio::test]
    async fn test_overrides_and_invalid_values() {
        let config = memory_config();
        config.set_global_config_value(config_keys::MAX_BATCH_SIZE, "25").unwrap();
        config.set_global_config_value(config_keys::ALLOW_RESULT_CORRECTION, "false").unwrap();
        config.set_global_config_value(config_keys::DEFAULT_ROUND_LENGTH_DAYS, "abc").unwrap();

        assert_eq!(config.get_max_batch_size().await.unwrap(), 25);
        assert_eq!(
            config.get_global_config_value(config_keys::MAX_BATCH_SIZE).unwrap().as_deref(),
            Some("25")
        );
        assert!(config.get_global_config_value("no_such_key").unwrap().is_none());
        assert!(!config.get_allow_result_correction().await.unwrap());
        // 非法值回退默认
        assert_eq!(config.get_default_round_length_days().await.unwrap(), 14);

        config.set_global_config_value(config_keys::MAX_BATCH_SIZE, "0").unwrap();
        assert_eq!(config.get_max_batch_size().await.unwrap(), 1);

        config.set_global_config_value(config_keys::DEFAULT_ROUND_LENGTH_DAYS, "100000").unwrap();
        assert_eq!(config.get_default_round_length_days().await.unwrap(), MAX_ROUND_LENGTH_DAYS);
    }

    #[test]
    fn test_config_snapshot() {
        let config = memory_config();
        config.set_global_config_value(config_keys::SEASON_NAME_PREFIX, "Liga").unwrap();
        let snapshot = config.get_config_snapshot().unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed.get("season_name_prefix").map(String::as_str), Some("Liga"));
    }
}
