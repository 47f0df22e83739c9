//! RSO RL - Tabular reinforcement learning for storage capacity control
//!
//! This crate provides the discretized state encoding, the three-action
//! space, an epsilon-greedy tabular Q-learner, and the engine that owns
//! all process-wide learning state.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]

pub mod algorithm;
pub mod engine;
pub mod experience;
pub mod state;

pub use algorithm::{decay_epsilon, EpsilonSchedule, QLearning, RLAlgorithm};
pub use engine::{EngineStats, RLEngine};
pub use experience::{BoundedLog, Experience};
pub use state::{Action, Reward, StateKey};
