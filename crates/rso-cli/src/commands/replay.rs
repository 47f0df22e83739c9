//! Scripted manual operations
//!
//! Each operation is `add:N`, `remove:N`, `train:N`, `base:N` or `reset`.
//! Rejected add/remove operations are reported and the script continues.

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use rso_core::util::parse_amount;
use rso_daemon::{Config, HistoryEntry, StorageController, StorageSummary};

use super::{print_json, print_summary};

#[derive(Args)]
pub struct ReplayArgs {
    /// Operations to apply, e.g. add:80 train:100 remove:30
    #[arg(required = true)]
    pub ops: Vec<String>,

    /// Seed for the learner and the usage walk
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOp {
    /// Raw amount text; validated by the controller boundary
    Add(String),
    Remove(String),
    Train(u64),
    Base(u64),
    Reset,
}

impl FromStr for ReplayOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "reset" {
            return Ok(Self::Reset);
        }
        let Some((op, arg)) = s.split_once(':') else {
            bail!("Unknown operation '{s}'");
        };
        match op {
            "add" => Ok(Self::Add(arg.to_string())),
            "remove" => Ok(Self::Remove(arg.to_string())),
            "train" => Ok(Self::Train(
                arg.parse()
                    .with_context(|| format!("Invalid episode count in '{s}'"))?,
            )),
            "base" => Ok(Self::Base(
                arg.parse()
                    .with_context(|| format!("Invalid base unit size in '{s}'"))?,
            )),
            _ => bail!("Unknown operation '{s}'"),
        }
    }
}

#[derive(Serialize)]
struct ReplayReport {
    summary: StorageSummary,
    history: Vec<HistoryEntry>,
    rejected: Vec<String>,
}

pub async fn run(args: ReplayArgs, json: bool) -> Result<()> {
    let ops = args
        .ops
        .iter()
        .map(|raw| raw.parse::<ReplayOp>())
        .collect::<Result<Vec<_>>>()?;

    let mut config = Config::load()?;
    if args.seed.is_some() {
        config.learning.seed = args.seed;
    }

    let mut controller = StorageController::from_config(&config);
    let rejected = apply(&mut controller, &ops);

    let report = ReplayReport {
        summary: controller.summary(),
        history: controller.history(),
        rejected,
    };

    if json {
        return print_json(&report);
    }

    for message in &report.rejected {
        println!("Rejected: {message}");
    }
    if !report.rejected.is_empty() {
        println!();
    }

    print_summary(&report.summary);

    if !report.history.is_empty() {
        println!("\nHistory (newest first):");
        for entry in &report.history {
            println!(
                "  {} [{:.1}% before] {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.utilization,
                entry.description
            );
        }
    }

    Ok(())
}

/// Apply operations in order, returning a message per rejected operation
pub fn apply(controller: &mut StorageController, ops: &[ReplayOp]) -> Vec<String> {
    let mut rejected = Vec::new();
    for op in ops {
        let outcome = match op {
            ReplayOp::Add(raw) => parse_amount(raw).and_then(|n| controller.add_usage(n)),
            ReplayOp::Remove(raw) => parse_amount(raw).and_then(|n| controller.remove_usage(n)),
            ReplayOp::Train(episodes) => {
                controller.run_episodes(*episodes);
                continue;
            }
            ReplayOp::Base(size) => {
                controller.set_base_unit_size(*size);
                continue;
            }
            ReplayOp::Reset => {
                controller.reset();
                continue;
            }
        };
        if let Err(e) = outcome {
            rejected.push(e.to_string());
        }
    }
    rejected
}
