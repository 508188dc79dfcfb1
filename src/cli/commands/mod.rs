//! CLI command implementations.

pub mod cache;
pub mod indicators;
pub mod series;
pub mod signals;
pub mod strategies;
pub mod validate;

use anyhow::{Context, Result};
use stockscope_config::AppConfig;
use stockscope_engine::SignalEngine;

/// Build the engine the data commands share.
pub async fn engine(config: &AppConfig) -> Result<SignalEngine> {
    SignalEngine::from_config(config)
        .await
        .context("Failed to initialise data providers and cache")
}
