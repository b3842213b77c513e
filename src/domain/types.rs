// ==========================================
// 联赛排程与积分榜引擎 - 领域类型定义
// ==========================================
// 职责: 选手标识、座位、赛段、赛季状态、操作身份
// 红线: 轮空必须是显式变体,禁止用空值占位
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 选手标识 (Player Id)
// ==========================================
// 由外部账号系统拥有,引擎只读取,不解析其格式
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ==========================================
// 座位 (Seat)
// ==========================================
// 奇数人数时补一个轮空座位,凡与轮空配对的选手本轮休息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Seat {
    Player(PlayerId),
    Bye,
}

// ==========================================
// 赛段 (Leg)
// ==========================================
// 双循环: 第一循环(主) + 第二循环(主客互换)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Leg {
    First,  // 第一循环
    Second, // 第二循环
}

impl Leg {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Leg::First => "FIRST",
            Leg::Second => "SECOND",
        }
    }

    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "SECOND" => Leg::Second,
            _ => Leg::First,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 赛季状态 (Season Status)
// ==========================================
// PLANNED: 已创建未生成赛程; ACTIVE: 赛程已提交
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonStatus {
    Planned,
    Active,
}

impl SeasonStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SeasonStatus::Planned => "PLANNED",
            SeasonStatus::Active => "ACTIVE",
        }
    }

    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "ACTIVE" => SeasonStatus::Active,
            _ => SeasonStatus::Planned,
        }
    }
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 操作身份 (Acting Identity)
// ==========================================
// 由调用方显式传入,引擎在写入前重新校验权限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingIdentity {
    pub player_id: PlayerId,
    pub is_admin: bool,
}

impl ActingIdentity {
    /// 管理员身份
    pub fn admin(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            is_admin: true,
        }
    }

    /// 普通选手身份
    pub fn player(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            is_admin: false,
        }
    }
}
