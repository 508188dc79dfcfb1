//! stockscope CLI application.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{commands, Cli, Commands};
use logging::setup_logging;
use std::path::PathBuf;
use stockscope_config::load_config;

const DEFAULT_CONFIG: &str = "config/default.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG);
        default.exists().then_some(default)
    });

    // Validation reports load errors itself, before any logging is set up.
    let command = match cli.command {
        Commands::ValidateConfig(args) => {
            return commands::validate::run(args, config_path.as_deref())
        }
        command => command,
    };

    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.format == "json";
    let _guard = setup_logging(&level, json, config.logging.file.as_deref())?;

    match command {
        Commands::Series(args) => commands::series::run(args, &config).await,
        Commands::Indicators(args) => commands::indicators::run(args, &config).await,
        Commands::Signals(args) => commands::signals::run(args, &config).await,
        Commands::Strategies(args) => commands::strategies::run(args),
        Commands::Cache(command) => commands::cache::run(command, &config).await,
        Commands::ValidateConfig(args) => commands::validate::run(args, config_path.as_deref()),
    }
}
