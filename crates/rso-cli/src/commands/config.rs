//! Configuration management commands

use anyhow::Result;
use clap::Subcommand;

use rso_daemon::Config;

const CONFIG_FILE: &str = "rso.toml";

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Initialize configuration file with defaults
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn run(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show().await,
        ConfigCommands::Init { force } => init(force).await,
    }
}

async fn show() -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    match Config::find_config_file() {
        Some(path) => println!("Config file: {}\n", path.display()),
        None => println!("No configuration file found. Using defaults.\n"),
    }

    // File plus RSO__* overrides, after validation
    let config = Config::load()?;
    println!("{}", config.to_toml()?);

    Ok(())
}

async fn init(force: bool) -> Result<()> {
    if std::path::Path::new(CONFIG_FILE).exists() && !force {
        println!("Configuration file already exists: {CONFIG_FILE}");
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(CONFIG_FILE, Config::default().to_toml()?)?;
    println!("Configuration file created: {CONFIG_FILE}");

    Ok(())
}
