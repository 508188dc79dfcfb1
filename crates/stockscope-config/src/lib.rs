//! Configuration management.
//!
//! Settings come from an optional TOML file overlaid with `STOCKSCOPE__*`
//! environment variables, e.g. `STOCKSCOPE__DATA__LOOKBACK_DAYS=730`.

mod settings;

pub use settings::{AppConfig, AppSettings, DataSettings, LoggingConfig};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from file and environment, then validate it.
///
/// With no path only built-in defaults and the environment apply.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let config: AppConfig = builder
        .add_source(
            Environment::with_prefix("STOCKSCOPE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}
