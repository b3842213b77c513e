// ==========================================
// 联赛排程与积分榜引擎 - 配对生成器
// ==========================================
// 算法: 圆桌法（固定 0 号位,其余位置轮转）
// 输入: 有序、不重复的选手 ID 列表
// 输出: 双循环轮次列表（第一循环 + 主客互换的第二循环）
// ==========================================
// 红线: 纯函数,无随机、无时钟、不依赖 ID 的字符串格式
// ==========================================

use crate::domain::{Leg, PlayerId, Seat};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// Pairing - 单场配对
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub home: PlayerId,
    pub away: PlayerId,
}

impl Pairing {
    /// 主客互换
    pub fn reversed(&self) -> Self {
        Self {
            home: self.away.clone(),
            away: self.home.clone(),
        }
    }
}

// ==========================================
// Round - 轮次
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32, // 从 1 开始,两循环连续编号
    pub leg: Leg,
    pub pairings: Vec<Pairing>,
    pub bye: Option<PlayerId>, // 本轮轮空的选手
}

// ==========================================
// PairingGenerator - 配对生成器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PairingGenerator {
    // 无状态引擎,不需要注入依赖
}

impl PairingGenerator {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成双循环轮次
    ///
    /// 第二循环按第一循环顺序重放并互换主客,
    /// 轮次号 = 第一循环轮数 + 原轮次号
    ///
    /// # 返回
    /// - Err(InvalidRoster): 少于 2 人或存在重复 ID
    pub fn generate_rounds(&self, player_ids: &[PlayerId]) -> EngineResult<Vec<Round>> {
        let first_leg = self.generate_first_leg(player_ids)?;
        let first_leg_count = first_leg.len() as u32;

        let second_leg: Vec<Round> = first_leg
            .iter()
            .map(|round| Round {
                round_number: first_leg_count + round.round_number,
                leg: Leg::Second,
                pairings: round.pairings.iter().map(Pairing::reversed).collect(),
                bye: round.bye.clone(),
            })
            .collect();

        let mut rounds = first_leg;
        rounds.extend(second_leg);
        Ok(rounds)
    }

    /// 生成第一循环
    ///
    /// 步骤:
    /// 1) 人数为奇数时补一个轮空座位,工作列表长度 m 为偶数
    /// 2) 共 m-1 轮;每轮 i 号位对阵 m-1-i 号位 (i < m/2)
    /// 3) 与轮空座位的配对丢弃,该选手本轮休息
    /// 4) 每轮结束: 末位移到 1 号位,0 号位固定
    pub fn generate_first_leg(&self, player_ids: &[PlayerId]) -> EngineResult<Vec<Round>> {
        Self::validate_roster(player_ids)?;

        let mut seats: Vec<Seat> = player_ids.iter().cloned().map(Seat::Player).collect();
        if seats.len() % 2 == 1 {
            seats.push(Seat::Bye);
        }

        let m = seats.len();
        let mut rounds = Vec::with_capacity(m - 1);

        for r in 0..(m - 1) {
            let mut pairings = Vec::with_capacity(m / 2);
            let mut bye = None;

            for i in 0..(m / 2) {
                match (&seats[i], &seats[m - 1 - i]) {
                    (Seat::Player(home), Seat::Player(away)) => pairings.push(Pairing {
                        home: home.clone(),
                        away: away.clone(),
                    }),
                    (Seat::Player(resting), Seat::Bye) | (Seat::Bye, Seat::Player(resting)) => {
                        bye = Some(resting.clone());
                    }
                    // 最多只有一个轮空座位
                    (Seat::Bye, Seat::Bye) => {}
                }
            }

            rounds.push(Round {
                round_number: r as u32 + 1,
                leg: Leg::First,
                pairings,
                bye,
            });

            if let Some(last) = seats.pop() {
                seats.insert(1, last);
            }
        }

        Ok(rounds)
    }

    /// 单循环轮数: 偶数 n-1, 奇数 n
    pub fn rounds_per_leg(roster_size: usize) -> usize {
        if roster_size < 2 {
            return 0;
        }
        roster_size + roster_size % 2 - 1
    }

    fn validate_roster(player_ids: &[PlayerId]) -> EngineResult<()> {
        if player_ids.len() < 2 {
            return Err(EngineError::InvalidRoster(format!(
                "至少需要 2 名选手，实际 {} 名",
                player_ids.len()
            )));
        }

        let mut seen = HashSet::with_capacity(player_ids.len());
        for id in player_ids {
            if !seen.insert(id) {
                return Err(EngineError::InvalidRoster(format!("选手重复: {}", id)));
            }
        }
        Ok(())
    }
}
