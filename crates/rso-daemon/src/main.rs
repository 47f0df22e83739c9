//! RSO Daemon - runs the storage controller and trains it continuously
//!
//! Starts the autonomous training loop, reports learning progress at a
//! fixed interval and prints a final summary on shutdown.

#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use rso_core::util::load_env_file;
use tracing::{error, info};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rso_daemon::{Config, ControllerService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from rso.env file first
    load_env_file();

    let config = Config::load()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "rsod={level},rso_daemon={level},rso_rl={level},rso_core={level}",
            level = config.daemon.log_level
        )
        .into()
    });

    // Optional copy of the log in `daemon.log_file`; the guard flushes on drop
    let (file_layer, _file_guard) = match file_writer(&config.daemon.log_file) {
        Some((writer, guard)) => (
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    info!("Starting RSO Daemon v{}", env!("CARGO_PKG_VERSION"));
    info!(
        base_unit_size = config.storage.base_unit_size,
        tick_interval_ms = config.training.tick_interval_ms,
        seed = ?config.learning.seed,
        log_file = %config.daemon.log_file,
        "Configuration loaded"
    );

    let service = ControllerService::from_config(&config);
    info!(params = %service.algorithm_params().await, "Learner ready");

    if config.training.autostart {
        service.start_training().await;
    } else {
        info!("Autostart disabled; waiting for shutdown");
    }

    let report_every = Duration::from_secs(config.daemon.report_interval_secs.max(1));
    let mut report = tokio::time::interval(report_every);
    report.tick().await;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = report.tick() => {
                let summary = service.summary().await;
                info!(
                    episode = summary.episode,
                    used = summary.used,
                    capacity = summary.capacity,
                    utilization_pct = %format!("{:.1}", summary.utilization_pct),
                    total_reward = %format!("{:.2}", summary.total_reward),
                    epsilon = %format!("{:.4}", summary.epsilon),
                    states = summary.q_table_size,
                    "Progress"
                );
            }
        }
    }

    info!("Initiating graceful shutdown...");
    if let Some(steps) = service.stop_training().await {
        info!(steps, "Training stopped");
    }

    let summary = service.summary().await;
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to render summary: {}", e),
    }

    info!("RSO Daemon stopped");
    Ok(())
}

/// Non-blocking writer for `path`, or `None` when unset or the directory
/// cannot be created
fn file_writer(path: &str) -> Option<(NonBlocking, WorkerGuard)> {
    if path.is_empty() {
        return None;
    }
    let path = Path::new(path);
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path.file_name()?;
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Warning: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    Some(tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name)))
}

/// Wait for shutdown signal (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}. Using fallback.", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}. Using Ctrl+C only.", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        () = terminate => {
            info!("Received SIGTERM");
        }
    }
}
