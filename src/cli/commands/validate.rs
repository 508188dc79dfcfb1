//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use stockscope_config::load_config;

use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs, config_path: Option<&Path>) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {}", path.display()),
        None => println!("Validating built-in defaults (no configuration file)"),
    }

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Cache directory: {}", config.data.cache_dir.display());
            println!("Refresh window: {}h", config.data.refresh_window_hours);
            println!("Lookback: {} days", config.data.lookback_days);
            let providers: Vec<&str> = config.data.providers.iter().map(|p| p.kind()).collect();
            println!("Providers: {}", providers.join(" -> "));

            if args.show {
                println!();
                print!("{}", config.to_toml()?);
            }
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
