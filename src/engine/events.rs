// ==========================================
// 联赛排程与积分榜引擎 - 引擎层事件发布
// ==========================================
// 职责: 定义联赛事件发布 trait，实现依赖倒置
// 说明: Engine 层定义 trait，宿主应用实现适配器（通知、缓存刷新等）
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 联赛事件类型
// ==========================================

/// 联赛事件触发类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeagueEventType {
    /// 赛程已提交
    ScheduleGenerated,
    /// 赛果已录入（含更正）
    MatchResultRecorded,
}

impl LeagueEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            LeagueEventType::ScheduleGenerated => "ScheduleGenerated",
            LeagueEventType::MatchResultRecorded => "MatchResultRecorded",
        }
    }
}

/// 联赛事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueEvent {
    /// 赛季 ID
    pub season_id: String,
    /// 事件类型
    pub event_type: LeagueEventType,
    /// 事件来源描述
    pub source: Option<String>,
    /// 相关比赛（赛程级事件为 None）
    pub match_id: Option<String>,
}

impl LeagueEvent {
    /// 赛季级事件
    pub fn season_scope(season_id: String, event_type: LeagueEventType, source: Option<String>) -> Self {
        Self {
            season_id,
            event_type,
            source,
            match_id: None,
        }
    }

    /// 单场比赛事件
    pub fn match_scope(
        season_id: String,
        match_id: String,
        event_type: LeagueEventType,
        source: Option<String>,
    ) -> Self {
        Self {
            season_id,
            event_type,
            source,
            match_id: Some(match_id),
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 联赛事件发布者 Trait
///
/// # 实现说明
/// - 发布失败不回滚已提交的写入,调用方只记录日志
pub trait LeagueEventPublisher: Send + Sync {
    /// 发布联赛事件
    ///
    /// # 返回
    /// - `Ok(task_id)`: 任务 ID（如果支持）或空字符串
    /// - `Err`: 发布失败
    fn publish(&self, event: LeagueEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn LeagueEventPublisher>> 的使用
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn LeagueEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn LeagueEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn from_option(publisher: Option<Arc<dyn LeagueEventPublisher>>) -> Self {
        match publisher {
            Some(p) => Self::with_publisher(p),
            None => Self::none(),
        }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: LeagueEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    "OptionalEventPublisher: 未配置发布者，跳过事件 - season_id={}, event_type={}",
                    event.season_id,
                    event.event_type.as_str()
                );
                Ok(String::new())
            }
        }
    }

    /// 发布事件,失败只记录日志
    ///
    /// 写入已提交后调用,发布失败不影响业务结果
    pub fn publish_or_log(&self, event: LeagueEvent) {
        let season_id = event.season_id.clone();
        let event_type = event.event_type.as_str().to_string();
        match self.publish(event) {
            Ok(task_id) => {
                if !task_id.is_empty() {
                    tracing::info!(
                        "联赛事件已发布: task_id={}, season_id={}, event_type={}",
                        task_id,
                        season_id,
                        event_type
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    "联赛事件发布失败: season_id={}, event_type={}, error={}",
                    season_id,
                    event_type,
                    e
                );
            }
        }
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
