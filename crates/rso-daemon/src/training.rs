//! Autonomous training loop
//!
//! A recurring tick that runs one full training step under the controller
//! lock. Stopping signals the loop and waits for it to exit, so once
//! `TrainingHandle::stop` returns no further step can run. A tick that
//! already started always completes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::StorageController;

/// Periodic driver for `StorageController::train_step`
pub struct TrainingLoop {
    controller: Arc<Mutex<StorageController>>,
    period: Duration,
}

impl TrainingLoop {
    pub fn new(controller: Arc<Mutex<StorageController>>, period: Duration) -> Self {
        Self { controller, period }
    }

    /// Spawn onto the current runtime
    pub fn spawn(self) -> TrainingHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        TrainingHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Tick until shutdown is signalled or the sender is dropped.
    /// Returns the number of steps taken.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(period_ms = self.period.as_millis() as u64, "Starting training loop");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately; the first step waits a full period
        ticker.tick().await;

        let mut steps = 0u64;
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let result = {
                        let mut controller = self.controller.lock().await;
                        controller.train_step()
                    };
                    steps += 1;
                    if result.episode % 100 == 0 {
                        debug!(
                            episode = result.episode,
                            total_reward = result.total_reward,
                            epsilon = result.epsilon,
                            "Training progress"
                        );
                    }
                }
            }
        }

        info!(steps, "Training loop stopped");
        steps
    }
}

/// Running training loop
pub struct TrainingHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl TrainingHandle {
    /// Signal the loop and wait for it to exit; returns steps taken
    pub async fn stop(self) -> u64 {
        // send fails only when the loop is already gone
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(steps) => steps,
            Err(e) => {
                warn!("Training loop task failed: {}", e);
                0
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
