// ==========================================
// 联赛排程与积分榜引擎 - 积分榜计算
// ==========================================
// 排序（降序）: 积分 → 净胜局 → 胜场
// 剩余并列保持首次出现顺序（稳定排序）
// 未录入任何比赛结果的选手不出现在榜上
// ==========================================

use crate::domain::{LeagueMatch, PlayerId, StandingsRow};
use crate::engine::error::EngineResult;
use crate::repository::league_store::LeagueStore;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct StandingsAggregator<S: LeagueStore> {
    store: Arc<S>,
}

impl<S: LeagueStore> StandingsAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 读取赛季全部比赛并计算积分榜（只读）
    #[instrument(skip(self), fields(season_id = %season_id))]
    pub async fn compute_standings(&self, season_id: &str) -> EngineResult<Vec<StandingsRow>> {
        let matches = self.store.query_matches(season_id, None).await?;
        let table = aggregate(&matches);
        debug!(
            season_id = %season_id,
            matches = matches.len(),
            rows = table.len(),
            "积分榜计算完成"
        );
        Ok(table)
    }
}

/// 由比赛集合计算积分榜（纯函数）
pub fn aggregate(matches: &[LeagueMatch]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::new();
    let mut index: HashMap<PlayerId, usize> = HashMap::new();

    for m in matches {
        let Some(result) = m.result.as_ref().filter(|_| m.completed) else {
            continue;
        };

        let sides = [
            (&m.home_id, result.home_points, result.home_games, result.away_games),
            (&m.away_id, result.away_points, result.away_games, result.home_games),
        ];

        for (player_id, points, won, lost) in sides {
            let slot = *index.entry(player_id.clone()).or_insert_with(|| {
                rows.push(StandingsRow::new(player_id.clone()));
                rows.len() - 1
            });
            let row = &mut rows[slot];
            row.points += points;
            row.games_won += won;
            row.games_lost += lost;
            row.matches_played += 1;
            if won > lost {
                row.match_wins += 1;
            }
        }
    }

    rows.sort_by(compare_rows);
    rows
}

/// 积分榜排序比较（降序）
pub fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.game_differential().cmp(&a.game_differential()))
        .then_with(|| b.match_wins.cmp(&a.match_wins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, MatchOutcome, MatchResult};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn played(home: &str, away: &str, home_games: i32, away_games: i32) -> LeagueMatch {
        let mut m = LeagueMatch::scheduled("S1", 1, Leg::First, home.into(), away.into(), day());
        let outcome = MatchOutcome::from_games(home_games, away_games).unwrap();
        m.apply_result(MatchResult::from_outcome(
            outcome,
            day().and_hms_opt(20, 0, 0).unwrap(),
            "admin",
        ));
        m
    }

    fn pending(home: &str, away: &str) -> LeagueMatch {
        LeagueMatch::scheduled("S1", 2, Leg::First, home.into(), away.into(), day())
    }

    fn order(table: &[StandingsRow]) -> Vec<&str> {
        table.iter().map(|r| r.player_id.as_str()).collect()
    }

    #[test]
    fn test_basic_table() {
        let table = aggregate(&[played("A", "B", 2, 0), played("A", "C", 2, 1)]);

        assert_eq!(order(&table), vec!["A", "C", "B"]);
        assert_eq!(table[0].points, 5);
        assert_eq!(table[0].game_differential(), 3);
        assert_eq!(table[0].match_wins, 2);
        assert_eq!(table[0].matches_played, 2);
        assert_eq!(table[1].points, 1);
        assert_eq!(table[1].game_differential(), -1);
        assert_eq!(table[2].points, 0);
        assert_eq!(table[2].game_differential(), -2);
    }

    #[test]
    fn test_match_wins_break_points_and_differential_tie() {
        // X: 2 胜 2 负 = 8 分, 净胜 +2
        // Y: 4 胜 1 负 = 8 分, 净胜 +2
        let matches = vec![
            played("X", "O1", 2, 0),
            played("X", "O2", 2, 0),
            played("X", "O3", 1, 2),
            played("X", "O4", 1, 2),
            played("Y", "O5", 2, 1),
            played("Y", "O6", 2, 1),
            played("Y", "O7", 2, 1),
            played("Y", "O8", 2, 1),
            played("Y", "O9", 0, 2),
        ];
        let table = aggregate(&matches);

        let x = table.iter().position(|r| r.player_id.as_str() == "X").unwrap();
        let y = table.iter().position(|r| r.player_id.as_str() == "Y").unwrap();
        assert_eq!(table[x].points, table[y].points);
        assert_eq!(table[x].game_differential(), table[y].game_differential());
        assert!(y < x, "胜场多者排名靠前");
    }

    #[test]
    fn test_residual_tie_keeps_first_appearance() {
        let table = aggregate(&[played("B", "A", 2, 1), played("A", "B", 2, 1)]);
        // 两人 3 分, 净胜 0, 1 胜
        assert_eq!(order(&table), vec!["B", "A"]);
    }

    #[test]
    fn test_unplayed_matches_ignored() {
        let table = aggregate(&[played("A", "B", 0, 2), pending("C", "D")]);
        assert_eq!(order(&table), vec!["B", "A"]);
        assert_eq!(table[0].points, 3);
        assert!(aggregate(&[pending("A", "B")]).is_empty());
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_points_sum_over_mixed_results() {
        let table = aggregate(&[
            played("A", "B", 2, 1),
            played("B", "A", 2, 0),
            played("A", "B", 1, 2),
        ]);
        // A: 2 + 0 + 1 = 3; B: 1 + 3 + 2 = 6
        assert_eq!(order(&table), vec!["B", "A"]);
        assert_eq!(table[0].points, 6);
        assert_eq!(table[1].points, 3);
        assert_eq!(table[0].games_won, 5);
        assert_eq!(table[0].games_lost, 3);
    }
}
