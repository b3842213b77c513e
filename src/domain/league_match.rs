// ==========================================
// 联赛排程与积分榜引擎 - 比赛领域模型
// ==========================================
// 红线: 已完成的比赛必须同时带有合法比分与对应积分
// 红线: 未完成的比赛二者皆无
// ==========================================

use crate::domain::types::{Leg, PlayerId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// MatchOutcome - 三局两胜的合法结果
// ==========================================
// 积分表固定,不可配置:
// 2:0 → 3:0, 2:1 → 2:1, 1:2 → 1:2, 0:2 → 0:3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    HomeSweep, // 2:0
    HomeWin,   // 2:1
    AwayWin,   // 1:2
    AwaySweep, // 0:2
}

impl MatchOutcome {
    /// 由局数解析结果,不在四种合法结果内返回 None
    pub fn from_games(home_games: i32, away_games: i32) -> Option<Self> {
        match (home_games, away_games) {
            (2, 0) => Some(MatchOutcome::HomeSweep),
            (2, 1) => Some(MatchOutcome::HomeWin),
            (1, 2) => Some(MatchOutcome::AwayWin),
            (0, 2) => Some(MatchOutcome::AwaySweep),
            _ => None,
        }
    }

    /// (主队局数, 客队局数)
    pub fn games(&self) -> (u32, u32) {
        match self {
            MatchOutcome::HomeSweep => (2, 0),
            MatchOutcome::HomeWin => (2, 1),
            MatchOutcome::AwayWin => (1, 2),
            MatchOutcome::AwaySweep => (0, 2),
        }
    }

    /// (主队积分, 客队积分)
    pub fn points(&self) -> (u32, u32) {
        match self {
            MatchOutcome::HomeSweep => (3, 0),
            MatchOutcome::HomeWin => (2, 1),
            MatchOutcome::AwayWin => (1, 2),
            MatchOutcome::AwaySweep => (0, 3),
        }
    }
}

// ==========================================
// MatchResult - 比赛结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_games: u32,
    pub away_games: u32,
    pub home_points: u32,
    pub away_points: u32,
    pub recorded_at: NaiveDateTime,
    pub recorded_by: String,
}

impl MatchResult {
    /// 按固定积分表生成结果
    pub fn from_outcome(
        outcome: MatchOutcome,
        recorded_at: NaiveDateTime,
        recorded_by: impl Into<String>,
    ) -> Self {
        let (home_games, away_games) = outcome.games();
        let (home_points, away_points) = outcome.points();
        Self {
            home_games,
            away_games,
            home_points,
            away_points,
            recorded_at,
            recorded_by: recorded_by.into(),
        }
    }

    /// 比分文本,形如 "2:1"
    pub fn score_label(&self) -> String {
        format!("{}:{}", self.home_games, self.away_games)
    }
}

// ==========================================
// LeagueMatch - 比赛
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueMatch {
    pub match_id: String,
    pub season_id: String,
    pub round_number: u32, // 从 1 开始,两循环连续编号
    pub leg: Leg,
    pub home_id: PlayerId,
    pub away_id: PlayerId,
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub result: Option<MatchResult>,
}

impl LeagueMatch {
    /// 创建未完成的比赛
    pub fn scheduled(
        season_id: impl Into<String>,
        round_number: u32,
        leg: Leg,
        home_id: PlayerId,
        away_id: PlayerId,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            match_id: uuid::Uuid::new_v4().to_string(),
            season_id: season_id.into(),
            round_number,
            leg,
            home_id,
            away_id,
            scheduled_date,
            completed: false,
            result: None,
        }
    }

    /// 是否为本场比赛的参赛方
    pub fn is_participant(&self, player_id: &PlayerId) -> bool {
        &self.home_id == player_id || &self.away_id == player_id
    }

    /// 附加结果 (覆盖旧结果)
    pub fn apply_result(&mut self, result: MatchResult) {
        self.completed = true;
        self.result = Some(result);
    }
}
