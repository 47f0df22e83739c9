//! Configuration loading and validation tests

use std::fs;
use std::path::PathBuf;

use rso_core::RsoError;
use rso_daemon::{Config, StorageController};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("rso.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[storage]
base_unit_size = 30

[learning]
learning_rate = 0.2
seed = 99
"#,
    );

    let config = Config::load_from(Some(&path)).unwrap();
    assert_eq!(config.storage.base_unit_size, 30);
    assert_eq!(config.storage.max_container_size, 100);
    assert_eq!(config.learning.learning_rate, 0.2);
    assert_eq!(config.learning.discount_factor, 0.95);
    assert_eq!(config.learning.seed, Some(99));
    assert_eq!(config.training.metrics_window, 50);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = Config::load_from(Some(&path)).unwrap();
    assert_eq!(config.storage.base_unit_size, 50);
    assert_eq!(config.learning.initial_epsilon, 0.3);
    assert_eq!(config.training.history_window, 10);
}

#[test]
fn test_out_of_range_base_unit_is_clamped() {
    let dir = TempDir::new().unwrap();
    let low = write_config(&dir, "[storage]\nbase_unit_size = 3\n");
    assert_eq!(
        Config::load_from(Some(&low)).unwrap().storage.base_unit_size,
        10
    );

    let high = write_config(&dir, "[storage]\nbase_unit_size = 400\n");
    assert_eq!(
        Config::load_from(Some(&high)).unwrap().storage.base_unit_size,
        100
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let cases = [
        "[learning]\nlearning_rate = 0.0\n",
        "[learning]\ndiscount_factor = 1.5\n",
        "[learning]\nepsilon_floor = 0.5\ninitial_epsilon = 0.3\n",
        "[training]\ntick_interval_ms = 0\n",
        "[training]\nmin_delta = 10\nmax_delta = 2\n",
        "[training]\nmetrics_window = 0\n",
        "[storage]\nbuffer_percent = -0.1\n",
    ];

    for contents in cases {
        let path = write_config(&dir, contents);
        let err = Config::load_from(Some(&path)).unwrap_err();
        assert!(
            matches!(err.downcast_ref::<RsoError>(), Some(RsoError::Config(_))),
            "expected config error for {contents:?}, got {err}"
        );
    }
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[storage\nbase_unit_size = ");
    assert!(Config::load_from(Some(&path)).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[daemon]\nreport_interval_secs = 3\n");

    std::env::set_var("RSO__DAEMON__REPORT_INTERVAL_SECS", "9");
    let result = Config::load_from(Some(&path));
    std::env::remove_var("RSO__DAEMON__REPORT_INTERVAL_SECS");

    assert_eq!(result.unwrap().daemon.report_interval_secs, 9);
}

#[test]
fn test_rendered_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.base_unit_size = 70;
    config.training.autostart = false;

    let path = write_config(&dir, &config.to_toml().unwrap());
    let loaded = Config::load_from(Some(&path)).unwrap();
    assert_eq!(loaded.storage.base_unit_size, 70);
    assert!(!loaded.training.autostart);
}

#[test]
fn test_controller_honors_configured_base_unit() {
    let mut config = Config::default();
    config.storage.base_unit_size = 80;
    config.learning.seed = Some(1);

    let controller = StorageController::from_config(&config);
    assert_eq!(controller.capacity(), 80);
    assert_eq!(controller.containers().len(), 1);
    assert_eq!(controller.base_unit_size(), 80);
}
