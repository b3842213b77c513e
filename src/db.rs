// ==========================================
// 联赛排程与积分榜引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 建表与 schema_version 登记
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
///
/// 表:
/// - season: 赛季 + 赛程提交标记
/// - season_player: 赛季成员, (season_id, player_id) 唯一
/// - league_match: 比赛, 结果列在录入前全部为 NULL
/// - config_kv: 全局配置
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS season (
            season_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            round_length_days INTEGER NOT NULL CHECK (round_length_days >= 1),
            status TEXT NOT NULL DEFAULT 'PLANNED',
            schedule_generated INTEGER NOT NULL DEFAULT 0,
            schedule_generated_at TEXT,
            schedule_generated_by TEXT,
            roster_size INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS season_player (
            season_id TEXT NOT NULL REFERENCES season(season_id) ON DELETE CASCADE,
            player_id TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (season_id, player_id)
        );

        CREATE TABLE IF NOT EXISTS league_match (
            match_id TEXT PRIMARY KEY,
            season_id TEXT NOT NULL REFERENCES season(season_id) ON DELETE CASCADE,
            round_number INTEGER NOT NULL CHECK (round_number >= 1),
            leg TEXT NOT NULL,
            home_id TEXT NOT NULL,
            away_id TEXT NOT NULL,
            scheduled_date TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            home_games INTEGER,
            away_games INTEGER,
            home_points INTEGER,
            away_points INTEGER,
            result_recorded_at TEXT,
            result_recorded_by TEXT,
            CHECK (home_id <> away_id)
        );

        CREATE INDEX IF NOT EXISTS idx_league_match_season_round
            ON league_match(season_id, round_number);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 打开连接、应用 PRAGMA 并确保 schema 存在
pub fn open_and_migrate(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    ensure_schema(&conn)?;

    match read_schema_version(&conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            tracing::warn!(
                db_version = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema 版本高于当前程序,可能存在不兼容字段"
            );
        }
        _ => {}
    }

    Ok(conn)
}
