//! Configuration loading for the RSO daemon

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use rso_core::util::clamp_base_unit_size;
use rso_core::{
    AllocatorParams, RsoError, DEFAULT_BASE_UNIT_SIZE, DEFAULT_BUFFER_PERCENT, MAX_CONTAINER_SIZE,
};
use rso_rl::algorithm::{
    DEFAULT_DISCOUNT_FACTOR, DEFAULT_EPSILON_DECAY, DEFAULT_EPSILON_FLOOR,
    DEFAULT_INITIAL_EPSILON, DEFAULT_LEARNING_RATE,
};
use rso_rl::{EpsilonSchedule, QLearning, RLEngine};

/// Configuration for the daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub storage: StorageConfig,
    pub learning: LearningConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub log_level: String,
    /// Empty means stdout only
    pub log_file: String,
    pub report_interval_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: String::new(),
            report_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_unit_size: u64,
    pub max_container_size: u64,
    pub buffer_percent: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_unit_size: DEFAULT_BASE_UNIT_SIZE,
            max_container_size: MAX_CONTAINER_SIZE,
            buffer_percent: DEFAULT_BUFFER_PERCENT,
        }
    }
}

impl StorageConfig {
    pub fn allocator_params(&self) -> AllocatorParams {
        AllocatorParams {
            max_container_size: self.max_container_size,
            buffer_percent: self.buffer_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_floor: f64,
    /// Fixed seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            initial_epsilon: DEFAULT_INITIAL_EPSILON,
            epsilon_decay: DEFAULT_EPSILON_DECAY,
            epsilon_floor: DEFAULT_EPSILON_FLOOR,
            seed: None,
        }
    }
}

impl LearningConfig {
    pub fn schedule(&self) -> EpsilonSchedule {
        EpsilonSchedule {
            initial: self.initial_epsilon,
            decay_rate: self.epsilon_decay,
            floor: self.epsilon_floor,
        }
    }

    /// Build an engine with a Q-learner seeded from `seed` when present
    pub fn build_engine(&self) -> RLEngine {
        let algorithm = match self.seed {
            Some(seed) => QLearning::with_seed(self.learning_rate, self.discount_factor, seed),
            None => QLearning::new(self.learning_rate, self.discount_factor),
        };
        RLEngine::with_algorithm(Box::new(algorithm), self.schedule())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub tick_interval_ms: u64,
    /// Chance that a training step perturbs usage at all
    pub change_probability: f64,
    pub min_delta: i64,
    pub max_delta: i64,
    pub metrics_window: usize,
    pub history_window: usize,
    pub autostart: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            change_probability: 0.5,
            min_delta: -5,
            max_delta: 14,
            metrics_window: 50,
            history_window: 10,
            autostart: true,
        }
    }
}

impl TrainingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::find_config_file().as_deref())
    }

    /// Load from an explicit file (if any) layered under `RSO__*` env vars
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = path {
            tracing::info!("Loading config from: {:?}", path);
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        } else {
            tracing::info!("No config file found, using defaults");
        }

        // Environment variables with RSO__ prefix, e.g. RSO__STORAGE__BASE_UNIT_SIZE
        builder = builder.add_source(
            Environment::with_prefix("RSO")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder
            .build()?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()
    }

    /// Reject values the controller cannot run with; clamp the base unit size
    pub fn validate(mut self) -> Result<Self> {
        let clamped = clamp_base_unit_size(self.storage.base_unit_size);
        if clamped != self.storage.base_unit_size {
            tracing::warn!(
                configured = self.storage.base_unit_size,
                clamped,
                "storage.base_unit_size out of range, clamping"
            );
            self.storage.base_unit_size = clamped;
        }

        let checks: [(bool, &str); 9] = [
            (self.storage.max_container_size > 0, "storage.max_container_size must be positive"),
            (self.storage.buffer_percent >= 0.0, "storage.buffer_percent must not be negative"),
            (
                self.learning.learning_rate > 0.0 && self.learning.learning_rate <= 1.0,
                "learning.learning_rate must be in (0, 1]",
            ),
            (
                (0.0..1.0).contains(&self.learning.discount_factor),
                "learning.discount_factor must be in [0, 1)",
            ),
            (
                self.learning.epsilon_decay > 0.0 && self.learning.epsilon_decay <= 1.0,
                "learning.epsilon_decay must be in (0, 1]",
            ),
            (
                (0.0..=self.learning.initial_epsilon).contains(&self.learning.epsilon_floor)
                    && self.learning.initial_epsilon <= 1.0,
                "learning epsilons must satisfy 0 <= epsilon_floor <= initial_epsilon <= 1",
            ),
            (self.training.tick_interval_ms > 0, "training.tick_interval_ms must be positive"),
            (
                self.training.min_delta <= self.training.max_delta
                    && (0.0..=1.0).contains(&self.training.change_probability),
                "training deltas must be ordered and change_probability in [0, 1]",
            ),
            (
                self.training.metrics_window > 0 && self.training.history_window > 0,
                "training windows must be positive",
            ),
        ];

        for (ok, message) in checks {
            if !ok {
                return Err(RsoError::Config(message.to_string()).into());
            }
        }

        Ok(self)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: RSO_CONFIG env, ./rso.toml, ~/.config/rso/rso.toml
        if let Ok(path) = std::env::var("RSO_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from("rso.toml");
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config").join("rso").join("rso.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config.storage.base_unit_size, 50);
        assert_eq!(config.training.metrics_window, 50);
        assert_eq!(config.training.history_window, 10);
        assert_eq!(config.learning.initial_epsilon, 0.3);
    }

    #[test]
    fn test_base_unit_is_clamped() {
        let mut config = Config::default();
        config.storage.base_unit_size = 500;
        assert_eq!(config.validate().unwrap().storage.base_unit_size, 100);
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let mut config = Config::default();
        config.learning.discount_factor = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.training.tick_interval_ms, 100);
        assert_eq!(parsed.storage.max_container_size, 100);
        assert!(parsed.learning.seed.is_none());
    }
}
