//! Moving Average Crossover Strategy.
//!
//! Generates buy signals when the short MA crosses above the long MA,
//! and sell signals when the short MA crosses below the long MA.

use serde::{Deserialize, Serialize};
use stockscope_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{PriceSeries, Signal},
};
use stockscope_indicators::{Ema, Sma};

use crate::crossover::{crossover_signals, relative_gap, strength_tier};

/// Configuration for the SMA Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmaCrossoverConfig {
    /// Short moving average period
    pub short_period: usize,
    /// Long moving average period
    pub long_period: usize,
    /// Use EMA instead of SMA
    pub use_ema: bool,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 20,
            long_period: 50,
            use_ema: false,
        }
    }
}

impl StrategyConfig for SmaCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.short_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Short period must be greater than 0".into(),
            ));
        }
        if self.short_period >= self.long_period {
            return Err(StrategyError::InvalidConfig(
                "Short period must be less than long period".into(),
            ));
        }
        Ok(())
    }
}

/// Moving Average Crossover Strategy.
pub struct SmaCrossoverStrategy {
    config: SmaCrossoverConfig,
}

impl SmaCrossoverStrategy {
    pub fn new(config: SmaCrossoverConfig) -> Self {
        Self { config }
    }

    fn calculate_ma(&self, series: &PriceSeries, period: usize) -> Result<Vec<Option<f64>>, StrategyError> {
        let values = if self.config.use_ema {
            Ema::new(period)?.calculate(series)?
        } else {
            Sma::new(period)?.calculate(series)?
        };
        Ok(values)
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn description(&self) -> &str {
        "Signals when the short moving average crosses the long moving average"
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        let short = self.calculate_ma(series, self.config.short_period)?;
        let long = self.calculate_ma(series, self.config.long_period)?;

        Ok(crossover_signals(series, self.name(), &short, &long, |_, s, l| {
            strength_tier(relative_gap(s, l), 0.02, 0.01)
        }))
    }

    fn warmup_period(&self) -> usize {
        self.config.long_period + 1
    }
}
