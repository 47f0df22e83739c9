//! Controller service - async, single-owner access to the storage controller
//!
//! Every operation takes the controller lock for its whole duration, so
//! manual operations and training ticks are serialized and never observe
//! each other's intermediate state.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use rso_core::{Allocation, Result};
use rso_rl::EngineStats;

use crate::config::Config;
use crate::controller::{HistoryEntry, MetricRecord, StepResult, StorageController, StorageSummary};
use crate::training::{TrainingHandle, TrainingLoop};

/// Service wrapping the controller with async access and a training loop
pub struct ControllerService {
    controller: Arc<Mutex<StorageController>>,
    tick_interval: Duration,
    training: Mutex<Option<TrainingHandle>>,
}

impl ControllerService {
    pub fn new(controller: StorageController, tick_interval: Duration) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            tick_interval,
            training: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        info!(
            base_unit_size = config.storage.base_unit_size,
            tick_interval_ms = config.training.tick_interval_ms,
            "Controller service initialized"
        );
        Self::new(
            StorageController::from_config(config),
            config.training.tick_interval(),
        )
    }

    /// Start the recurring training step; false if already running
    pub async fn start_training(&self) -> bool {
        let mut training = self.training.lock().await;
        if training.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }
        *training = Some(TrainingLoop::new(self.controller.clone(), self.tick_interval).spawn());
        true
    }

    /// Stop training; returns the steps the loop ran, or `None` if idle
    pub async fn stop_training(&self) -> Option<u64> {
        let handle = self.training.lock().await.take()?;
        Some(handle.stop().await)
    }

    pub async fn is_training(&self) -> bool {
        self.training
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub async fn step(&self, usage_override: Option<u64>) -> StepResult {
        self.controller.lock().await.step(usage_override)
    }

    pub async fn run_episodes(&self, episodes: u64) -> Option<StepResult> {
        self.controller.lock().await.run_episodes(episodes)
    }

    pub async fn add_usage(&self, amount: i64) -> Result<StepResult> {
        self.controller.lock().await.add_usage(amount)
    }

    pub async fn remove_usage(&self, amount: i64) -> Result<StepResult> {
        self.controller.lock().await.remove_usage(amount)
    }

    pub async fn set_base_unit_size(&self, size: u64) -> u64 {
        self.controller.lock().await.set_base_unit_size(size)
    }

    /// Stop training, then reinitialize all state.
    ///
    /// The training slot stays locked throughout, so a concurrent
    /// `start_training` only takes effect after the reset.
    pub async fn reset(&self) {
        let mut training = self.training.lock().await;
        if let Some(handle) = training.take() {
            handle.stop().await;
        }
        self.controller.lock().await.reset();
    }

    pub async fn algorithm_params(&self) -> serde_json::Value {
        self.controller.lock().await.algorithm_params()
    }

    pub async fn set_algorithm_params(&self, params: serde_json::Value) -> Result<()> {
        self.controller.lock().await.set_algorithm_params(params)
    }

    pub async fn summary(&self) -> StorageSummary {
        self.controller.lock().await.summary()
    }

    pub async fn allocation(&self) -> Allocation {
        self.controller.lock().await.allocation().clone()
    }

    pub async fn metrics(&self) -> Vec<MetricRecord> {
        self.controller.lock().await.metrics()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.controller.lock().await.history()
    }

    pub async fn stats(&self) -> ServiceStats {
        let (engine, params) = {
            let controller = self.controller.lock().await;
            (controller.stats(), controller.algorithm_params())
        };
        ServiceStats {
            training: self.is_training().await,
            engine,
            params,
        }
    }
}

/// Learning statistics, learner parameters and loop status
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub training: bool,
    #[serde(flatten)]
    pub engine: EngineStats,
    pub params: serde_json::Value,
}
