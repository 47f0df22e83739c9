//! Reward shaping for capacity decisions
//!
//! Four independent, additive components evaluated after every repack:
//! a piecewise-constant utilization bracket, a continuous waste penalty,
//! a growth penalty and a conditional shrink bonus.

use serde::Serialize;

use rso_rl::Reward;

/// Utilization band that earns the bonus (inclusive)
const TARGET_LOW: f64 = 0.6;
const TARGET_HIGH: f64 = 0.9;
/// Below this utilization the pool is considered badly oversized
const UNDERUSED: f64 = 0.3;
/// Above this utilization the pool is considered dangerously full
const OVERUSED: f64 = 0.95;

const TARGET_BONUS: f64 = 10.0;
const UNDERUSED_PENALTY: f64 = -15.0;
const OVERUSED_PENALTY: f64 = -10.0;
const WASTE_WEIGHT: f64 = 5.0;
const GROWTH_PENALTY: f64 = -2.0;
const SHRINK_BONUS: f64 = 5.0;
/// Shrinking only pays when the result is at least this utilized (exclusive)
const SHRINK_MIN_UTILIZATION: f64 = 0.5;

/// Individual reward components; `total()` equals `compute_reward`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub utilization: f64,
    pub waste: f64,
    pub base: f64,
    pub waste_penalty: f64,
    pub growth_penalty: f64,
    pub shrink_bonus: f64,
}

impl RewardBreakdown {
    /// Score a new (used, total) against the total before the step.
    /// `total` must be positive.
    pub fn evaluate(used: u64, total: u64, prev_total: u64) -> Self {
        let used_f = used as f64;
        let total_f = total as f64;
        let utilization = used_f / total_f;
        let waste = (total_f - used_f) / total_f;

        let base = if (TARGET_LOW..=TARGET_HIGH).contains(&utilization) {
            TARGET_BONUS
        } else if utilization < UNDERUSED {
            UNDERUSED_PENALTY
        } else if utilization > OVERUSED {
            OVERUSED_PENALTY
        } else {
            0.0
        };

        let growth_penalty = if total > prev_total { GROWTH_PENALTY } else { 0.0 };
        let shrink_bonus = if total < prev_total && utilization > SHRINK_MIN_UTILIZATION {
            SHRINK_BONUS
        } else {
            0.0
        };

        Self {
            utilization,
            waste,
            base,
            waste_penalty: -(waste * WASTE_WEIGHT),
            growth_penalty,
            shrink_bonus,
        }
    }

    pub fn total(&self) -> Reward {
        self.base + self.waste_penalty + self.growth_penalty + self.shrink_bonus
    }
}

/// Reward for landing on `total` capacity with `used` GB, coming from `prev_total`
pub fn compute_reward(used: u64, total: u64, prev_total: u64) -> Reward {
    RewardBreakdown::evaluate(used, total, prev_total).total()
}
