//! RL algorithm trait and the tabular Q-learning implementation

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use rso_core::{Result, RsoError};

use crate::experience::Experience;
use crate::state::{Action, StateKey};

/// Default step size (alpha)
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
/// Default discount factor (gamma)
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.95;
/// Exploration rate after start or reset
pub const DEFAULT_INITIAL_EPSILON: f64 = 0.3;
/// Multiplicative epsilon decay per step
pub const DEFAULT_EPSILON_DECAY: f64 = 0.995;
/// Epsilon never decays below this
pub const DEFAULT_EPSILON_FLOOR: f64 = 0.01;

/// Trait for RL algorithms
pub trait RLAlgorithm: Send + Sync {
    /// Algorithm name
    fn name(&self) -> &str;

    /// Stored value for (state, action), 0 when unseen
    fn value(&self, state: &StateKey, action: Action) -> f64;

    /// Best known action; ties go to the lowest index
    fn greedy_action(&self, state: &StateKey) -> Action;

    /// Epsilon-greedy selection
    fn select_action(&mut self, state: &StateKey, epsilon: f64) -> Action;

    /// Apply one transition, returning the temporal-difference error
    fn update(&mut self, experience: &Experience) -> f64;

    /// Forget everything learned
    fn reset(&mut self);

    /// Number of states with stored values
    fn table_size(&self) -> usize;

    /// Get algorithm parameters as JSON
    fn get_params(&self) -> serde_json::Value;

    /// Set algorithm parameters from JSON
    fn set_params(&mut self, params: serde_json::Value) -> Result<()>;
}

/// Q-Learning implementation (tabular)
pub struct QLearning {
    q_table: HashMap<StateKey, [f64; 3]>,
    learning_rate: f64,
    discount_factor: f64,
    rng: StdRng,
}

impl QLearning {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self::with_rng(learning_rate, discount_factor, StdRng::from_entropy())
    }

    /// Deterministic learner for reproducible runs
    pub fn with_seed(learning_rate: f64, discount_factor: f64, seed: u64) -> Self {
        Self::with_rng(learning_rate, discount_factor, StdRng::seed_from_u64(seed))
    }

    fn with_rng(learning_rate: f64, discount_factor: f64, rng: StdRng) -> Self {
        Self {
            q_table: HashMap::new(),
            learning_rate,
            discount_factor,
            rng,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    fn q_values(&self, state: &StateKey) -> [f64; 3] {
        self.q_table.get(state).copied().unwrap_or([0.0; 3])
    }

    fn max_value(&self, state: &StateKey) -> f64 {
        self.q_values(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl RLAlgorithm for QLearning {
    fn name(&self) -> &str {
        "q_learning"
    }

    fn value(&self, state: &StateKey, action: Action) -> f64 {
        self.q_values(state)[action.to_index()]
    }

    fn greedy_action(&self, state: &StateKey) -> Action {
        let q_values = self.q_values(state);
        let mut best = 0;
        for (idx, value) in q_values.iter().enumerate().skip(1) {
            if *value > q_values[best] {
                best = idx;
            }
        }
        Action::ALL[best]
    }

    fn select_action(&mut self, state: &StateKey, epsilon: f64) -> Action {
        if self.rng.gen::<f64>() < epsilon {
            Action::ALL[self.rng.gen_range(0..Action::action_space_size())]
        } else {
            self.greedy_action(state)
        }
    }

    fn update(&mut self, experience: &Experience) -> f64 {
        let current_q = self.value(&experience.state, experience.action);
        let max_next_q = self.max_value(&experience.next_state);
        let td_error = experience.reward + self.discount_factor * max_next_q - current_q;
        let new_q = current_q + self.learning_rate * td_error;

        let q_values = self.q_table.entry(experience.state).or_insert([0.0; 3]);
        q_values[experience.action.to_index()] = new_q;

        td_error
    }

    fn reset(&mut self) {
        self.q_table.clear();
    }

    fn table_size(&self) -> usize {
        self.q_table.len()
    }

    fn get_params(&self) -> serde_json::Value {
        serde_json::json!({
            "learning_rate": self.learning_rate,
            "discount_factor": self.discount_factor,
            "q_table_size": self.q_table.len()
        })
    }

    fn set_params(&mut self, params: serde_json::Value) -> Result<()> {
        if let Some(lr) = params["learning_rate"].as_f64() {
            if !(lr > 0.0 && lr <= 1.0) {
                return Err(RsoError::Config(format!(
                    "learning_rate must be in (0, 1], got {lr}"
                )));
            }
            self.learning_rate = lr;
        }
        if let Some(df) = params["discount_factor"].as_f64() {
            if !(0.0..1.0).contains(&df) {
                return Err(RsoError::Config(format!(
                    "discount_factor must be in [0, 1), got {df}"
                )));
            }
            self.discount_factor = df;
        }
        Ok(())
    }
}

impl Default for QLearning {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE, DEFAULT_DISCOUNT_FACTOR)
    }
}

/// Exploration schedule: multiplicative decay down to a floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonSchedule {
    pub initial: f64,
    pub decay_rate: f64,
    pub floor: f64,
}

impl EpsilonSchedule {
    /// Next epsilon after one step
    pub fn decay(&self, epsilon: f64) -> f64 {
        decay_epsilon(epsilon, self.decay_rate, self.floor)
    }
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_EPSILON,
            decay_rate: DEFAULT_EPSILON_DECAY,
            floor: DEFAULT_EPSILON_FLOOR,
        }
    }
}

/// `max(floor, epsilon * decay_rate)`
pub fn decay_epsilon(epsilon: f64, decay_rate: f64, floor: f64) -> f64 {
    (epsilon * decay_rate).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learner() -> QLearning {
        QLearning::with_seed(DEFAULT_LEARNING_RATE, DEFAULT_DISCOUNT_FACTOR, 7)
    }

    #[test]
    fn test_unseen_value_is_zero() {
        let q = learner();
        let state = StateKey::new(10, 90);
        for action in Action::ALL {
            assert_eq!(q.value(&state, action), 0.0);
        }
        assert_eq!(q.table_size(), 0);
    }

    #[test]
    fn test_query_does_not_insert() {
        let q = learner();
        let _ = q.greedy_action(&StateKey::new(1, 99));
        assert_eq!(q.table_size(), 0);
    }

    #[test]
    fn test_update_rule() {
        let mut q = learner();
        let s = StateKey::new(50, 50);
        let s2 = StateKey::new(80, 20);

        q.update(&Experience::new(s, Action::Grow, 10.0, s2));
        // 0 + 0.1 * (10 + 0.95 * 0 - 0)
        assert!((q.value(&s, Action::Grow) - 1.0).abs() < 1e-12);

        q.update(&Experience::new(s2, Action::NoOp, 4.0, s2));
        assert!((q.value(&s2, Action::NoOp) - 0.4).abs() < 1e-12);

        q.update(&Experience::new(s, Action::Grow, 10.0, s2));
        // 1 + 0.1 * (10 + 0.95 * 0.4 - 1)
        let expected = 1.0 + 0.1 * (10.0 + 0.95 * 0.4 - 1.0);
        assert!((q.value(&s, Action::Grow) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_negative_next_values_use_true_max() {
        let mut q = learner();
        let s = StateKey::new(20, 80);
        let s2 = StateKey::new(5, 95);
        q.update(&Experience::new(s2, Action::NoOp, -10.0, s2));
        q.update(&Experience::new(s2, Action::Grow, -20.0, s2));
        q.update(&Experience::new(s2, Action::Shrink, -30.0, s2));

        let max_next = q.value(&s2, Action::NoOp);
        let td = q.update(&Experience::new(s, Action::NoOp, 0.0, s2));
        assert!((td - 0.95 * max_next).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_tie_break_prefers_lowest_index() {
        let mut q = learner();
        let s = StateKey::new(60, 40);
        assert_eq!(q.greedy_action(&s), Action::NoOp);

        q.update(&Experience::new(s, Action::Grow, 5.0, s));
        assert_eq!(q.greedy_action(&s), Action::Grow);

        // bring Shrink to exactly the same value as Grow
        let grow = q.value(&s, Action::Grow);
        q.q_table.get_mut(&s).unwrap()[Action::Shrink.to_index()] = grow;
        assert_eq!(q.greedy_action(&s), Action::Grow);
    }

    #[test]
    fn test_select_action_greedy_when_epsilon_zero() {
        let mut q = learner();
        let s = StateKey::new(70, 30);
        q.update(&Experience::new(s, Action::Shrink, 3.0, s));
        for _ in 0..100 {
            assert_eq!(q.select_action(&s, 0.0), Action::Shrink);
        }
    }

    #[test]
    fn test_select_action_explores_when_epsilon_one() {
        let mut q = learner();
        let s = StateKey::new(70, 30);
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[q.select_action(&s, 1.0).to_index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_reset_clears_table() {
        let mut q = learner();
        let s = StateKey::new(70, 30);
        q.update(&Experience::new(s, Action::Shrink, 3.0, s));
        assert_eq!(q.table_size(), 1);
        q.reset();
        assert_eq!(q.table_size(), 0);
        assert_eq!(q.value(&s, Action::Shrink), 0.0);
    }

    #[test]
    fn test_decay_epsilon() {
        assert!((decay_epsilon(0.3, 0.995, 0.01) - 0.2985).abs() < 1e-12);
        assert_eq!(decay_epsilon(0.01, 0.995, 0.01), 0.01);
        assert_eq!(decay_epsilon(0.0100001, 0.5, 0.01), 0.01);
    }

    #[test]
    fn test_params_roundtrip() {
        let mut q = learner();
        q.set_params(serde_json::json!({"learning_rate": 0.5})).unwrap();
        assert_eq!(q.get_params()["learning_rate"], 0.5);
        assert!(q
            .set_params(serde_json::json!({"discount_factor": 1.5}))
            .is_err());
        assert_eq!(q.discount_factor(), DEFAULT_DISCOUNT_FACTOR);
    }
}
