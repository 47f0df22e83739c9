//! RSO CLI - Command line interface for the storage optimizer
//!
//! Runs the allocator and the controller in-process. Useful for inspecting
//! packing decisions, running offline training sessions and replaying
//! scripted manual operations.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_precision_loss)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use rso_core::util::load_env_file;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{config, optimize, replay, simulate};

#[derive(Parser)]
#[command(name = "rso")]
#[command(author, version, about = "RSO - RL storage optimizer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a usage figure into containers
    Optimize(optimize::OptimizeArgs),

    /// Run training episodes offline and report the result
    Simulate(simulate::SimulateArgs),

    /// Apply a script of manual operations in order
    Replay(replay::ReplayArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from rso.env file (before parsing args)
    load_env_file();

    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Optimize(args) => optimize::run(args, cli.json).await,
        Commands::Simulate(args) => simulate::run(args, cli.json).await,
        Commands::Replay(args) => replay::run(args, cli.json).await,
        Commands::Config(cmd) => config::run(cmd).await,
    }
}

/// Filter covering the CLI and every library crate it drives
fn default_filter(verbose: bool) -> String {
    let l = if verbose { "debug" } else { "warn" };
    format!("rso={l},rso_daemon={l},rso_rl={l},rso_core={l}")
}
