//! RSO Daemon - storage capacity controller with a self-tuning learner
//!
//! The controller owns all mutable state; the service serializes access to
//! it and drives the optional autonomous training loop.

// Pedantic clippy allows - intentional design decisions for this crate:
// - cast_precision_loss: GB counts stay far below 2^52
// - cast_possible_truncation: millisecond durations fit in u64
// - cast_sign_loss / cast_possible_wrap: usage deltas are bounded by config
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod config;
pub mod controller;
pub mod reward;
pub mod service;
pub mod training;
pub mod usage;

pub use config::Config;
pub use controller::{
    ControllerSettings, HistoryEntry, HistoryKind, MetricRecord, StepMode, StepResult,
    StorageController, StorageSummary,
};
pub use reward::{compute_reward, RewardBreakdown};
pub use service::{ControllerService, ServiceStats};
pub use training::{TrainingHandle, TrainingLoop};
pub use usage::{Fixed, RandomWalk, Scripted, UsageModel};
