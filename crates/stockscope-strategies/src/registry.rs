//! Strategy registry for creating strategies by name.

use crate::{
    BollingerConfig, BollingerStrategy, MacdCrossoverConfig, MacdCrossoverStrategy, RsiConfig,
    RsiStrategy, SmaCrossoverConfig, SmaCrossoverStrategy, StochasticConfig, StochasticStrategy,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stockscope_core::{error::StrategyError, traits::Strategy, traits::StrategyConfig};
use tracing::debug;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for the built-in strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

fn info<C: Default + Serialize>(name: &str, description: &str) -> StrategyInfo {
    StrategyInfo {
        name: name.to_string(),
        description: description.to_string(),
        default_config: serde_json::to_value(C::default()).unwrap_or(serde_json::Value::Null),
    }
}

/// Parse a config from partial JSON; missing fields take their defaults.
fn parse_config<C>(params: serde_json::Value) -> Result<C, StrategyError>
where
    C: StrategyConfig + Default + DeserializeOwned,
{
    let config: C = if params.is_null() {
        C::default()
    } else {
        serde_json::from_value(params).map_err(|e| StrategyError::InvalidConfig(e.to_string()))?
    };
    config.validate()?;
    Ok(config)
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let entries = [
            info::<SmaCrossoverConfig>(
                "sma_crossover",
                "Signals when the short moving average crosses the long moving average",
            ),
            info::<RsiConfig>(
                "rsi",
                "Signals when RSI leaves the oversold or overbought zone",
            ),
            info::<MacdCrossoverConfig>(
                "macd_crossover",
                "Signals when the MACD line crosses its signal line",
            ),
            info::<BollingerConfig>(
                "bollinger_bands",
                "Signals when the close returns inside the Bollinger Bands",
            ),
            info::<StochasticConfig>(
                "stochastic",
                "Signals on %K/%D crosses in the oversold or overbought zone",
            ),
        ];

        Self {
            strategies: entries
                .into_iter()
                .map(|info| (info.name.clone(), info))
                .collect(),
        }
    }

    /// List all available strategies, sorted by name.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Get all strategy names.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Create a strategy instance from (possibly partial) JSON parameters.
    ///
    /// `null` or `{}` yields the default configuration.
    pub fn create(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        debug!(strategy = name, %params, "Creating strategy");

        match name {
            "sma_crossover" => Ok(Box::new(SmaCrossoverStrategy::new(parse_config(params)?))),
            "rsi" => Ok(Box::new(RsiStrategy::new(parse_config(params)?))),
            "macd_crossover" => Ok(Box::new(MacdCrossoverStrategy::new(parse_config(params)?))),
            "bollinger_bands" => Ok(Box::new(BollingerStrategy::new(parse_config(params)?))),
            "stochastic" => Ok(Box::new(StochasticStrategy::new(parse_config(params)?))),
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn Strategy>, StrategyError> {
        self.create(name, serde_json::Value::Null)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
