//! RL Engine - owns all process-wide learning state
//!
//! The engine is an explicit, injectable context: the learner, the current
//! exploration rate, the episode counter and the cumulative reward. Nothing
//! here is global; `reset` is the only way back to the initial state.

use tracing::{debug, info};

use crate::algorithm::{EpsilonSchedule, QLearning, RLAlgorithm};
use crate::experience::Experience;
use crate::state::{Action, StateKey};

/// RL Engine for action selection and learning
pub struct RLEngine {
    algorithm: Box<dyn RLAlgorithm>,
    schedule: EpsilonSchedule,
    epsilon: f64,
    episodes: u64,
    total_rewards: f64,
}

impl RLEngine {
    /// Create an engine with a default Q-learner
    pub fn new() -> Self {
        Self::with_algorithm(Box::new(QLearning::default()), EpsilonSchedule::default())
    }

    /// Create an engine around any algorithm
    pub fn with_algorithm(algorithm: Box<dyn RLAlgorithm>, schedule: EpsilonSchedule) -> Self {
        info!(
            algorithm = algorithm.name(),
            initial_epsilon = schedule.initial,
            "RL engine initialized"
        );
        Self {
            algorithm,
            epsilon: schedule.initial,
            schedule,
            episodes: 0,
            total_rewards: 0.0,
        }
    }

    /// Epsilon-greedy action for the state at the current exploration rate
    pub fn select_action(&mut self, state: &StateKey) -> Action {
        self.algorithm.select_action(state, self.epsilon)
    }

    /// Stored value for (state, action)
    pub fn value(&self, state: &StateKey, action: Action) -> f64 {
        self.algorithm.value(state, action)
    }

    /// Greedy action with no exploration
    pub fn best_action(&self, state: &StateKey) -> Action {
        self.algorithm.greedy_action(state)
    }

    /// Learn from one transition and close the episode.
    ///
    /// Updates the table, accumulates reward, decays epsilon and advances the
    /// episode counter. Returns the temporal-difference error.
    pub fn learn(&mut self, experience: &Experience) -> f64 {
        let td_error = self.algorithm.update(experience);
        self.total_rewards += experience.reward;
        self.epsilon = self.schedule.decay(self.epsilon);
        self.episodes += 1;

        debug!(
            episode = self.episodes,
            state = %experience.state,
            action = %experience.action,
            reward = experience.reward,
            td_error,
            epsilon = self.epsilon,
            "Learning step complete"
        );

        td_error
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    pub fn total_rewards(&self) -> f64 {
        self.total_rewards
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    /// Get statistics
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            episodes: self.episodes,
            total_rewards: self.total_rewards,
            average_reward: if self.episodes > 0 {
                self.total_rewards / self.episodes as f64
            } else {
                0.0
            },
            epsilon: self.epsilon,
            table_size: self.algorithm.table_size(),
            algorithm: self.algorithm.name().to_string(),
        }
    }

    /// Get algorithm parameters
    pub fn get_algorithm_params(&self) -> serde_json::Value {
        let mut params = self.algorithm.get_params();
        if let Some(obj) = params.as_object_mut() {
            obj.insert("epsilon".to_string(), self.epsilon.into());
            obj.insert("epsilon_decay".to_string(), self.schedule.decay_rate.into());
            obj.insert("epsilon_floor".to_string(), self.schedule.floor.into());
        }
        params
    }

    /// Set algorithm parameters
    pub fn set_algorithm_params(&mut self, params: serde_json::Value) -> rso_core::Result<()> {
        self.algorithm.set_params(params)
    }

    /// Clear the table, restore the initial epsilon and zero the counters
    pub fn reset(&mut self) {
        self.algorithm.reset();
        self.epsilon = self.schedule.initial;
        self.episodes = 0;
        self.total_rewards = 0.0;
        info!("RL engine reset");
    }
}

impl Default for RLEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStats {
    pub episodes: u64,
    pub total_rewards: f64,
    pub average_reward: f64,
    pub epsilon: f64,
    pub table_size: usize,
    pub algorithm: String,
}
