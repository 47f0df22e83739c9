//! State, Action, and Reward types for RL

use std::fmt;

use serde::{Deserialize, Serialize};

use rso_core::Allocation;

/// Reward value from environment
pub type Reward = f64;

/// Discretized learning state: floored utilization and waste percentages.
///
/// Two (used, total) pairs that floor to the same buckets are the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    /// floor(used / total * 100)
    pub utilization: u8,
    /// floor((total - used) / total * 100)
    pub waste: u8,
}

impl StateKey {
    pub fn new(utilization: u8, waste: u8) -> Self {
        Self { utilization, waste }
    }

    /// Encode a (used, total) pair. `total` must be positive.
    pub fn encode(used: u64, total: u64) -> Self {
        debug_assert!(total > 0, "state encoding requires a non-zero total");
        let used_f = used as f64;
        let total_f = total as f64;
        Self {
            utilization: bucket((used_f / total_f) * 100.0),
            waste: bucket(((total_f - used_f) / total_f) * 100.0),
        }
    }

    /// Encode the state an allocation leaves the system in
    pub fn from_allocation(allocation: &Allocation) -> Self {
        Self::encode(allocation.used(), allocation.total)
    }
}

// Float-to-int `as` saturates, so out-of-range ratios land on 0 or 255
fn bucket(percent: f64) -> u8 {
    percent.floor() as u8
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}_w{}", self.utilization, self.waste)
    }
}

/// Capacity action chosen by the policy.
///
/// The action is recorded with each transition but does not drive the
/// environment: capacity follows usage through the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoOp,
    Grow,
    Shrink,
}

impl Action {
    /// Every action in index order
    pub const ALL: [Action; 3] = [Action::NoOp, Action::Grow, Action::Shrink];

    /// Convert action to index for the discrete action space
    pub fn to_index(self) -> usize {
        match self {
            Action::NoOp => 0,
            Action::Grow => 1,
            Action::Shrink => 2,
        }
    }

    /// Create action from index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Number of discrete actions
    pub fn action_space_size() -> usize {
        Self::ALL.len()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::NoOp => "no_op",
            Action::Grow => "grow",
            Action::Shrink => "shrink",
        };
        f.write_str(name)
    }
}
