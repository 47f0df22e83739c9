//! Offline training session

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use rso_core::MAX_USAGE_GB;
use rso_daemon::{Config, MetricRecord, StorageController, StorageSummary};

use super::{print_json, print_summary};

/// Metric rows shown in table output
const METRICS_TAIL: usize = 10;

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of training steps to run
    #[arg(short, long, default_value_t = 1000)]
    pub episodes: u64,

    /// Seed for the learner and the usage walk
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Idle container size in GB
    #[arg(short, long)]
    pub base: Option<u64>,

    /// Usage in GB before training starts
    #[arg(
        short,
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u64).range(0..=MAX_USAGE_GB)
    )]
    pub initial_usage: u64,
}

#[derive(Serialize)]
struct SimulationReport {
    summary: StorageSummary,
    metrics: Vec<MetricRecord>,
}

pub async fn run(args: SimulateArgs, json: bool) -> Result<()> {
    let mut config = Config::load()?;
    if args.seed.is_some() {
        config.learning.seed = args.seed;
    }
    if let Some(base) = args.base {
        config.storage.base_unit_size = base;
    }
    let config = config.validate()?;

    let mut controller = StorageController::from_config(&config);
    if args.initial_usage > 0 {
        controller.step(Some(args.initial_usage));
    }

    tracing::info!(episodes = args.episodes, seed = ?config.learning.seed, "Simulating");
    controller.run_episodes(args.episodes);

    let report = SimulationReport {
        summary: controller.summary(),
        metrics: controller.metrics(),
    };

    if json {
        return print_json(&report);
    }

    println!("Simulation Results");
    println!("==================\n");
    print_summary(&report.summary);

    if report.metrics.is_empty() {
        return Ok(());
    }

    let average =
        report.metrics.iter().map(|m| m.reward).sum::<f64>() / report.metrics.len() as f64;
    println!(
        "\nAverage reward over last {} episodes: {:.2}",
        report.metrics.len(),
        average
    );

    println!(
        "\n{:<8} {:>9} {:>8} {:>8} {:>6}",
        "EPISODE", "REWARD", "UTIL", "STORAGE", "WASTE"
    );
    println!("{}", "-".repeat(43));
    let skip = report.metrics.len().saturating_sub(METRICS_TAIL);
    for m in report.metrics.iter().skip(skip) {
        println!(
            "{:<8} {:>9.2} {:>7.1}% {:>8} {:>6}",
            m.episode, m.reward, m.utilization, m.storage, m.waste
        );
    }

    Ok(())
}
