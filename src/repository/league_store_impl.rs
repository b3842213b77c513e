// ==========================================
// 联赛排程与积分榜引擎 - 联赛存储实现
// ==========================================
// 职责: 实现 LeagueStore（使用 rusqlite）
// 红线: Store 不含业务规则,只做数据读写
// ==========================================

use crate::db::open_and_migrate;
use crate::domain::{
    Leg, LeagueMatch, MatchResult, PlayerId, ScheduleMarker, Season, SeasonPlayer, SeasonStatus,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::league_store::{BatchWrite, LeagueStore};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

const MATCH_COLUMNS: &str = r#"
    match_id, season_id, round_number, leg, home_id, away_id, scheduled_date,
    completed, home_games, away_games, home_points, away_points,
    result_recorded_at, result_recorded_by
"#;

const SEASON_COLUMNS: &str = r#"
    season_id, name, start_date, round_length_days, status,
    schedule_generated, schedule_generated_at, schedule_generated_by, roster_size,
    created_at
"#;

fn limit_param(limit: Option<usize>) -> i64 {
    // SQLite: LIMIT -1 表示不限制
    limit.map(|l| l as i64).unwrap_or(-1)
}

fn map_match_row(row: &Row) -> rusqlite::Result<LeagueMatch> {
    let completed: bool = row.get(7)?;
    let home_games: Option<u32> = row.get(8)?;
    let away_games: Option<u32> = row.get(9)?;
    let home_points: Option<u32> = row.get(10)?;
    let away_points: Option<u32> = row.get(11)?;
    let recorded_at: Option<NaiveDateTime> = row.get(12)?;
    let recorded_by: Option<String> = row.get(13)?;

    // 结果列必须同时存在,否则视为未完成
    let result = match (completed, home_games, away_games, home_points, away_points, recorded_at) {
        (true, Some(home_games), Some(away_games), Some(home_points), Some(away_points), Some(recorded_at)) => {
            Some(MatchResult {
                home_games,
                away_games,
                home_points,
                away_points,
                recorded_at,
                recorded_by: recorded_by.unwrap_or_default(),
            })
        }
        _ => None,
    };

    Ok(LeagueMatch {
        match_id: row.get(0)?,
        season_id: row.get(1)?,
        round_number: row.get(2)?,
        leg: Leg::from_db_str(&row.get::<_, String>(3)?),
        home_id: PlayerId::new(row.get::<_, String>(4)?),
        away_id: PlayerId::new(row.get::<_, String>(5)?),
        scheduled_date: row.get::<_, NaiveDate>(6)?,
        completed: result.is_some(),
        result,
    })
}

fn map_season_row(row: &Row) -> rusqlite::Result<Season> {
    Ok(Season {
        season_id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get::<_, NaiveDate>(2)?,
        round_length_days: row.get(3)?,
        status: SeasonStatus::from_db_str(&row.get::<_, String>(4)?),
        schedule_generated: row.get(5)?,
        schedule_generated_at: row.get(6)?,
        schedule_generated_by: row.get(7)?,
        roster_size: row.get(8)?,
        created_at: row.get(9)?,
    })
}

// ==========================================
// LeagueStoreImpl
// ==========================================
pub struct LeagueStoreImpl {
    conn: Arc<Mutex<Connection>>,
}

impl LeagueStoreImpl {
    /// 创建新的 Store 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_migrate(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 Store 实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入单条记录
    fn write_one_tx(tx: &Transaction, write: &BatchWrite) -> RepositoryResult<()> {
        match write {
            BatchWrite::SeasonPlayer(member) => {
                tx.execute(
                    r#"
                    INSERT INTO season_player (season_id, player_id, joined_at)
                    VALUES (?1, ?2, ?3)
                    "#,
                    params![member.season_id, member.player_id.as_str(), member.joined_at],
                )?;
            }
            BatchWrite::Match(m) => {
                let result = m.result.as_ref();
                tx.execute(
                    r#"
                    INSERT INTO league_match (
                        match_id, season_id, round_number, leg, home_id, away_id, scheduled_date,
                        completed, home_games, away_games, home_points, away_points,
                        result_recorded_at, result_recorded_by
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                    "#,
                    params![
                        m.match_id,
                        m.season_id,
                        m.round_number,
                        m.leg.to_db_str(),
                        m.home_id.as_str(),
                        m.away_id.as_str(),
                        m.scheduled_date,
                        result.is_some(),
                        result.map(|r| r.home_games),
                        result.map(|r| r.away_games),
                        result.map(|r| r.home_points),
                        result.map(|r| r.away_points),
                        result.map(|r| r.recorded_at),
                        result.map(|r| r.recorded_by.clone()),
                    ],
                )?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LeagueStore for LeagueStoreImpl {
    async fn query_matches(
        &self,
        season_id: &str,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<LeagueMatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM league_match WHERE season_id = ?1 ORDER BY round_number ASC, rowid ASC LIMIT ?2",
            MATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let matches = stmt
            .query_map(params![season_id, limit_param(limit)], map_match_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    async fn get_match(&self, match_id: &str) -> RepositoryResult<Option<LeagueMatch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM league_match WHERE match_id = ?1", MATCH_COLUMNS);
        let found = conn
            .query_row(&sql, params![match_id], map_match_row)
            .optional()?;
        Ok(found)
    }

    async fn update_match(&self, match_id: &str, result: &MatchResult) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE league_match
            SET completed = 1,
                home_games = ?2,
                away_games = ?3,
                home_points = ?4,
                away_points = ?5,
                result_recorded_at = ?6,
                result_recorded_by = ?7
            WHERE match_id = ?1
            "#,
            params![
                match_id,
                result.home_games,
                result.away_games,
                result.home_points,
                result.away_points,
                result.recorded_at,
                result.recorded_by,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "LeagueMatch".to_string(),
                id: match_id.to_string(),
            });
        }
        Ok(())
    }

    async fn query_season_players(&self, season_id: &str) -> RepositoryResult<Vec<SeasonPlayer>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT season_id, player_id, joined_at
            FROM season_player
            WHERE season_id = ?1
            ORDER BY rowid ASC
            "#,
        )?;
        let members = stmt
            .query_map(params![season_id], |row| {
                Ok(SeasonPlayer {
                    season_id: row.get(0)?,
                    player_id: PlayerId::new(row.get::<_, String>(1)?),
                    joined_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    async fn batch_write(&self, writes: Vec<BatchWrite>) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for write in &writes {
            Self::write_one_tx(&tx, write)?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn insert_season(&self, season: &Season) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO season (
                season_id, name, start_date, round_length_days, status,
                schedule_generated, schedule_generated_at, schedule_generated_by, roster_size,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                season.season_id,
                season.name,
                season.start_date,
                season.round_length_days,
                season.status.to_db_str(),
                season.schedule_generated,
                season.schedule_generated_at,
                season.schedule_generated_by,
                season.roster_size,
                season.created_at,
            ],
        )?;
        Ok(())
    }

    async fn get_season(&self, season_id: &str) -> RepositoryResult<Option<Season>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM season WHERE season_id = ?1", SEASON_COLUMNS);
        let found = conn
            .query_row(&sql, params![season_id], map_season_row)
            .optional()?;
        Ok(found)
    }

    async fn list_seasons(&self, limit: Option<usize>) -> RepositoryResult<Vec<Season>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM season ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            SEASON_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let seasons = stmt
            .query_map(params![limit_param(limit)], map_season_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(seasons)
    }

    async fn update_season(&self, season_id: &str, marker: &ScheduleMarker) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE season
            SET schedule_generated = 1,
                schedule_generated_at = ?2,
                schedule_generated_by = ?3,
                roster_size = ?4,
                status = ?5
            WHERE season_id = ?1
            "#,
            params![
                season_id,
                marker.generated_at,
                marker.generated_by,
                marker.roster_size,
                SeasonStatus::Active.to_db_str(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Season".to_string(),
                id: season_id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::domain::MatchOutcome;

    fn memory_store() -> LeagueStoreImpl {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        LeagueStoreImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn test_season() -> Season {
        Season::new("S1", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 14, ts(1))
    }

    #[tokio::test]
    async fn test_season_roundtrip_and_marker() {
        let store = memory_store();
        let season = test_season();
        store.insert_season(&season).await.unwrap();

        let loaded = store.get_season(&season.season_id).await.unwrap().unwrap();
        assert_eq!(loaded, season);

        let marker = ScheduleMarker {
            generated_at: ts(2),
            generated_by: "admin".to_string(),
            roster_size: 4,
        };
        store.update_season(&season.season_id, &marker).await.unwrap();

        let loaded = store.get_season(&season.season_id).await.unwrap().unwrap();
        assert!(loaded.schedule_generated);
        assert_eq!(loaded.status, SeasonStatus::Active);
        assert_eq!(loaded.roster_size, Some(4));
        assert_eq!(loaded.schedule_generated_by.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_update_missing_season_is_not_found() {
        let store = memory_store();
        let marker = ScheduleMarker {
            generated_at: ts(2),
            generated_by: "admin".to_string(),
            roster_size: 2,
        };
        let err = store.update_season("missing", &marker).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_batch_write_is_atomic() {
        let store = memory_store();
        let season = test_season();
        store.insert_season(&season).await.unwrap();

        let member = SeasonPlayer {
            season_id: season.season_id.clone(),
            player_id: PlayerId::from("A"),
            joined_at: ts(2),
        };
        // 同一批次内重复成员 → 唯一约束失败 → 整批回滚
        let writes = vec![
            BatchWrite::SeasonPlayer(member.clone()),
            BatchWrite::SeasonPlayer(member),
        ];
        let err = store.batch_write(writes).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        let members = store.query_season_players(&season.season_id).await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_match_order_limit_and_result_update() {
        let store = memory_store();
        let season = test_season();
        store.insert_season(&season).await.unwrap();

        let m2 = LeagueMatch::scheduled(&season.season_id, 2, Leg::First, "A".into(), "C".into(), season.round_date(2).unwrap());
        let m1a = LeagueMatch::scheduled(&season.season_id, 1, Leg::First, "A".into(), "B".into(), season.round_date(1).unwrap());
        let m1b = LeagueMatch::scheduled(&season.season_id, 1, Leg::First, "C".into(), "D".into(), season.round_date(1).unwrap());
        let written = store
            .batch_write(vec![
                BatchWrite::Match(m2.clone()),
                BatchWrite::Match(m1a.clone()),
                BatchWrite::Match(m1b.clone()),
            ])
            .await
            .unwrap();
        assert_eq!(written, 3);

        let all = store.query_matches(&season.season_id, None).await.unwrap();
        let ids: Vec<_> = all.iter().map(|m| m.match_id.clone()).collect();
        assert_eq!(ids, vec![m1a.match_id.clone(), m1b.match_id.clone(), m2.match_id.clone()]);

        let first = store.query_matches(&season.season_id, Some(1)).await.unwrap();
        assert_eq!(first.len(), 1);

        let result = MatchResult::from_outcome(MatchOutcome::AwayWin, ts(3), "B");
        store.update_match(&m1a.match_id, &result).await.unwrap();
        let loaded = store.get_match(&m1a.match_id).await.unwrap().unwrap();
        assert!(loaded.completed);
        assert_eq!(loaded.result, Some(result));

        let untouched = store.get_match(&m1b.match_id).await.unwrap().unwrap();
        assert!(!untouched.completed);
        assert!(untouched.result.is_none());
    }

    #[tokio::test]
    async fn test_list_seasons_newest_first() {
        let store = memory_store();
        let older = Season::new("old", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 7, ts(1));
        let newer = Season::new("new", NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(), 7, ts(5));
        store.insert_season(&older).await.unwrap();
        store.insert_season(&newer).await.unwrap();

        let seasons = store.list_seasons(Some(1)).await.unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].name, "new");
    }
}
