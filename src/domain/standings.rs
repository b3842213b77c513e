// ==========================================
// 联赛排程与积分榜引擎 - 积分榜行
// ==========================================
// 派生数据,不落库,每次由比赛集合重新计算
// ==========================================

use crate::domain::types::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub player_id: PlayerId,
    pub points: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub match_wins: u32,
    pub matches_played: u32,
}

impl StandingsRow {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            points: 0,
            games_won: 0,
            games_lost: 0,
            match_wins: 0,
            matches_played: 0,
        }
    }

    /// 净胜局 = 胜局 - 负局
    pub fn game_differential(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}
