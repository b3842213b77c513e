// ==========================================
// 联赛排程与积分榜引擎 - 赛季领域模型
// ==========================================
// 红线: schedule_generated 只能 false→true 一次,本引擎从不重置
// ==========================================

use crate::domain::types::{PlayerId, SeasonStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 轮次间隔上限（天）
pub const MAX_ROUND_LENGTH_DAYS: u32 = 366;

// ==========================================
// Season - 赛季
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub round_length_days: u32, // 每轮间隔天数
    pub status: SeasonStatus,

    // ===== 赛程生成标记 (提交标记) =====
    pub schedule_generated: bool,
    pub schedule_generated_at: Option<NaiveDateTime>,
    pub schedule_generated_by: Option<String>,
    pub roster_size: Option<u32>, // 生成时的参赛人数

    pub created_at: NaiveDateTime,
}

impl Season {
    /// 创建一个尚未生成赛程的赛季
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        round_length_days: u32,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            season_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            start_date,
            round_length_days,
            status: SeasonStatus::Planned,
            schedule_generated: false,
            schedule_generated_at: None,
            schedule_generated_by: None,
            roster_size: None,
            created_at,
        }
    }

    /// 第 round_number 轮的比赛日期
    ///
    /// 公式: start_date + (round_number - 1) × round_length_days
    /// 第二循环沿用连续轮次,不另设偏移
    /// 日期超出可表示范围时返回 None
    pub fn round_date(&self, round_number: u32) -> Option<NaiveDate> {
        let offset_days = i64::from(round_number.saturating_sub(1))
            .checked_mul(i64::from(self.round_length_days))?;
        let offset = chrono::Duration::try_days(offset_days)?;
        self.start_date.checked_add_signed(offset)
    }

    /// 轮次间隔是否在 [1, MAX_ROUND_LENGTH_DAYS] 之内
    pub fn has_valid_round_length(&self) -> bool {
        (1..=MAX_ROUND_LENGTH_DAYS).contains(&self.round_length_days)
    }
}

// ==========================================
// SeasonPlayer - 赛季成员
// ==========================================
// (season_id, player_id) 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonPlayer {
    pub season_id: String,
    pub player_id: PlayerId,
    pub joined_at: NaiveDateTime,
}

// ==========================================
// ScheduleMarker - 赛程提交标记
// ==========================================
// 所有批次写入成功后,作为最后一次写入落到赛季上
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMarker {
    pub generated_at: NaiveDateTime,
    pub generated_by: String,
    pub roster_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_season(round_length_days: u32) -> Season {
        let created_at = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Season::new(
            "S1",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            round_length_days,
            created_at,
        )
    }

    #[test]
    fn test_round_date_arithmetic() {
        let season = test_season(14);
        assert_eq!(season.round_date(1), NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(season.round_date(2), NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(season.round_date(4), NaiveDate::from_ymd_opt(2026, 4, 12));
    }

    #[test]
    fn test_round_date_overflow_is_none() {
        let season = test_season(u32::MAX);
        assert_eq!(season.round_date(1), NaiveDate::from_ymd_opt(2026, 3, 1));
        assert!(season.round_date(2).is_none());
        assert!(season.round_date(u32::MAX).is_none());
        assert!(!season.has_valid_round_length());
    }

    #[test]
    fn test_round_length_bounds() {
        assert!(!test_season(0).has_valid_round_length());
        assert!(test_season(1).has_valid_round_length());
        assert!(test_season(MAX_ROUND_LENGTH_DAYS).has_valid_round_length());
        assert!(!test_season(MAX_ROUND_LENGTH_DAYS + 1).has_valid_round_length());
    }

    #[test]
    fn test_new_season_is_not_generated() {
        let season = test_season(7);
        assert!(!season.schedule_generated);
        assert_eq!(season.status, SeasonStatus::Planned);
        assert!(season.schedule_generated_at.is_none());
        assert!(!season.season_id.is_empty());
    }
}
