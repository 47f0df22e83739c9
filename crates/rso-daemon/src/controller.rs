//! Storage controller - the control loop tying allocator and learner together
//!
//! Each training step reads the current usage and capacity, asks the engine
//! for an action, lets usage drift, repacks, scores the result and feeds
//! the transition back. The chosen action is recorded with the transition
//! but never alters capacity: capacity only follows usage through the
//! allocator.
//!
//! Manual steps (add/remove) repack without touching the learner.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use rso_core::util::{clamp_base_unit_size, grown_usage, positive_amount};
use rso_core::{Allocation, Allocator, Container, Result, RsoError, MAX_USAGE_GB};
use rso_rl::{Action, BoundedLog, EngineStats, Experience, RLEngine, Reward, StateKey};

use crate::config::Config;
use crate::reward::compute_reward;
use crate::usage::{RandomWalk, UsageModel};

/// How a step was driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Usage drifted on its own and the learner was updated
    Training,
    /// Usage was set by the caller; no learning
    Manual,
}

/// Outcome of a single step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub mode: StepMode,
    /// Episode counter after the step
    pub episode: u64,
    /// Action the policy picked; `None` for manual steps
    pub action: Option<Action>,
    pub reward: Reward,
    pub total_reward: f64,
    pub epsilon: f64,
    pub allocation: Allocation,
    pub state: StateKey,
    pub next_state: StateKey,
}

/// One entry of the trailing training metrics log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub episode: u64,
    pub reward: Reward,
    /// Percent, unrounded
    pub utilization: f64,
    /// Total capacity after the step (GB)
    pub storage: u64,
    /// Unused capacity after the step (GB)
    pub waste: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Add,
    Remove,
}

/// Record of a manual add/remove
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub description: String,
    pub kind: HistoryKind,
    pub timestamp: DateTime<Utc>,
    /// Percent utilization when the operation was requested
    pub utilization: f64,
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, Serialize)]
pub struct StorageSummary {
    pub used: u64,
    pub capacity: u64,
    pub containers: usize,
    pub base_unit_size: u64,
    pub utilization_pct: f64,
    pub waste: u64,
    pub efficiency_pct: f64,
    pub episode: u64,
    pub total_reward: f64,
    pub epsilon: f64,
    pub q_table_size: usize,
}

/// Window sizes and packing parameters for a controller
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub base_unit_size: u64,
    pub allocator: Allocator,
    pub metrics_window: usize,
    pub history_window: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            base_unit_size: rso_core::DEFAULT_BASE_UNIT_SIZE,
            allocator: Allocator::default(),
            metrics_window: 50,
            history_window: 10,
        }
    }
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_unit_size: clamp_base_unit_size(config.storage.base_unit_size),
            allocator: Allocator::new(config.storage.allocator_params()),
            metrics_window: config.training.metrics_window,
            history_window: config.training.history_window,
        }
    }
}

/// Single owner of usage, capacity, containers, learning state and logs
pub struct StorageController {
    settings: ControllerSettings,
    used: u64,
    allocation: Allocation,
    engine: RLEngine,
    usage_model: Box<dyn UsageModel>,
    metrics: BoundedLog<MetricRecord>,
    history: BoundedLog<HistoryEntry>,
}

impl StorageController {
    pub fn new(
        settings: ControllerSettings,
        engine: RLEngine,
        usage_model: Box<dyn UsageModel>,
    ) -> Self {
        let allocation = settings.allocator.optimize(0, settings.base_unit_size);
        Self {
            used: 0,
            allocation,
            engine,
            usage_model,
            metrics: BoundedLog::new(settings.metrics_window),
            history: BoundedLog::new(settings.history_window),
            settings,
        }
    }

    /// Build everything from configuration
    pub fn from_config(config: &Config) -> Self {
        let usage_model = RandomWalk::from_config(
            &config.training,
            config.learning.seed.map(|seed| seed.wrapping_add(1)),
        );
        Self::new(
            ControllerSettings::from_config(config),
            config.learning.build_engine(),
            Box::new(usage_model),
        )
    }

    /// One atomic transition.
    ///
    /// `Some(usage)` is a manual step: usage is set exactly (capped at
    /// `MAX_USAGE_GB`), the learner is not consulted or updated, and counters
    /// stay put. `None` is a training step driven by the usage model.
    pub fn step(&mut self, usage_override: Option<u64>) -> StepResult {
        match usage_override {
            Some(usage) => self.manual_step(usage),
            None => self.train_step(),
        }
    }

    /// Training step: select, perturb, repack, score, learn, commit, log
    pub fn train_step(&mut self) -> StepResult {
        let prev_total = self.allocation.total;
        let state = StateKey::encode(self.used, prev_total);
        let action = self.engine.select_action(&state);

        let new_used = self.usage_model.next_usage(self.used).min(MAX_USAGE_GB);
        let allocation = self.repack(new_used);
        let next_state = StateKey::from_allocation(&allocation);
        let reward = compute_reward(new_used, allocation.total, prev_total);

        self.engine
            .learn(&Experience::new(state, action, reward, next_state));

        self.used = new_used;
        self.allocation = allocation;

        let episode = self.engine.episodes();
        self.metrics.push(MetricRecord {
            episode,
            reward,
            utilization: percent(new_used, self.allocation.total),
            storage: self.allocation.total,
            waste: self.allocation.total.saturating_sub(new_used),
        });

        debug!(
            episode,
            %state,
            %next_state,
            %action,
            used = new_used,
            total = self.allocation.total,
            reward,
            "Training step"
        );

        self.result(StepMode::Training, Some(action), reward, state, next_state)
    }

    fn manual_step(&mut self, new_used: u64) -> StepResult {
        if new_used > MAX_USAGE_GB {
            warn!(requested = new_used, limit = MAX_USAGE_GB, "Usage override capped");
        }
        let new_used = new_used.min(MAX_USAGE_GB);
        let prev_total = self.allocation.total;
        let state = StateKey::encode(self.used, prev_total);
        let allocation = self.repack(new_used);
        let next_state = StateKey::from_allocation(&allocation);
        // reported only; manual steps never feed the learner
        let reward = compute_reward(new_used, allocation.total, prev_total);

        self.used = new_used;
        self.allocation = allocation;

        debug!(
            used = new_used,
            total = self.allocation.total,
            "Manual step"
        );

        self.result(StepMode::Manual, None, reward, state, next_state)
    }

    /// Add `amount` GB of usage; rejects non-positive amounts and amounts
    /// that would take usage past `MAX_USAGE_GB`
    pub fn add_usage(&mut self, amount: i64) -> Result<StepResult> {
        let new_used = positive_amount(amount)
            .and_then(|amount| grown_usage(self.used, amount))
            .inspect_err(|e| {
                warn!(amount, error = %e, "Rejected add");
            })?;

        let utilization = self.utilization_pct();
        let result = self.step(Some(new_used));
        self.record_history(
            format!(
                "Added {amount} GB storage, optimized to {} GB",
                result.allocation.total
            ),
            HistoryKind::Add,
            utilization,
        );
        Ok(result)
    }

    /// Remove `amount` GB of usage; rejects non-positive amounts and
    /// amounts above current usage
    pub fn remove_usage(&mut self, amount: i64) -> Result<StepResult> {
        let amount = positive_amount(amount).inspect_err(|e| {
            warn!(amount, error = %e, "Rejected remove");
        })?;
        if amount > self.used {
            warn!(amount, used = self.used, "Rejected remove: exceeds usage");
            return Err(RsoError::InsufficientUsage {
                requested: amount,
                available: self.used,
            });
        }

        let utilization = self.utilization_pct();
        let result = self.step(Some(self.used - amount));
        self.record_history(
            format!(
                "Removed {amount} GB, optimized to {} GB",
                result.allocation.total
            ),
            HistoryKind::Remove,
            utilization,
        );
        Ok(result)
    }

    /// Run `episodes` training steps back to back
    pub fn run_episodes(&mut self, episodes: u64) -> Option<StepResult> {
        let mut last = None;
        for _ in 0..episodes {
            last = Some(self.train_step());
        }
        last
    }

    /// Change the idle container size (clamped to [10, 100]).
    ///
    /// While nothing is in use the pool is immediately rebuilt at the new
    /// size; otherwise it applies at the next idle repack.
    pub fn set_base_unit_size(&mut self, size: u64) -> u64 {
        let base = clamp_base_unit_size(size);
        self.settings.base_unit_size = base;
        if self.used == 0 {
            self.allocation = Allocation::idle(base);
        }
        info!(base_unit_size = base, "Base unit size updated");
        base
    }

    /// Reinitialize usage, capacity, containers, learning state and both logs
    pub fn reset(&mut self) {
        self.used = 0;
        self.allocation = self.repack(0);
        self.engine.reset();
        self.metrics.clear();
        self.history.clear();
        info!("Controller reset");
    }

    fn repack(&self, used: u64) -> Allocation {
        self.settings
            .allocator
            .optimize(used, self.settings.base_unit_size)
    }

    fn record_history(&mut self, description: String, kind: HistoryKind, utilization: f64) {
        info!(%description, "Manual operation");
        self.history.push(HistoryEntry {
            description,
            kind,
            timestamp: Utc::now(),
            utilization,
        });
    }

    fn result(
        &self,
        mode: StepMode,
        action: Option<Action>,
        reward: Reward,
        state: StateKey,
        next_state: StateKey,
    ) -> StepResult {
        StepResult {
            mode,
            episode: self.engine.episodes(),
            action,
            reward,
            total_reward: self.engine.total_rewards(),
            epsilon: self.engine.epsilon(),
            allocation: self.allocation.clone(),
            state,
            next_state,
        }
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn capacity(&self) -> u64 {
        self.allocation.total
    }

    pub fn containers(&self) -> &[Container] {
        &self.allocation.containers
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn base_unit_size(&self) -> u64 {
        self.settings.base_unit_size
    }

    pub fn episode(&self) -> u64 {
        self.engine.episodes()
    }

    pub fn total_reward(&self) -> f64 {
        self.engine.total_rewards()
    }

    pub fn epsilon(&self) -> f64 {
        self.engine.epsilon()
    }

    pub fn engine(&self) -> &RLEngine {
        &self.engine
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    /// Learner and exploration parameters as JSON
    pub fn algorithm_params(&self) -> serde_json::Value {
        self.engine.get_algorithm_params()
    }

    /// Update learner parameters; out-of-range values are rejected whole
    pub fn set_algorithm_params(&mut self, params: serde_json::Value) -> Result<()> {
        self.engine.set_algorithm_params(params)?;
        info!(params = %self.engine.get_algorithm_params(), "Learner parameters updated");
        Ok(())
    }

    /// Training metrics, oldest first
    pub fn metrics(&self) -> Vec<MetricRecord> {
        self.metrics.to_vec()
    }

    /// Manual operation history, newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.to_vec_recent()
    }

    pub fn utilization_pct(&self) -> f64 {
        percent(self.used, self.allocation.total)
    }

    pub fn summary(&self) -> StorageSummary {
        let capacity = self.allocation.total;
        let waste = capacity.saturating_sub(self.used);
        StorageSummary {
            used: self.used,
            capacity,
            containers: self.allocation.len(),
            base_unit_size: self.settings.base_unit_size,
            utilization_pct: self.utilization_pct(),
            waste,
            efficiency_pct: 100.0 - percent(waste, capacity),
            episode: self.engine.episodes(),
            total_reward: self.engine.total_rewards(),
            epsilon: self.engine.epsilon(),
            q_table_size: self.engine.stats().table_size,
        }
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
