//! MACD Crossover Strategy.
//!
//! Buys when the MACD line crosses above its signal line and sells on the
//! opposite cross.

use serde::{Deserialize, Serialize};
use stockscope_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{PriceSeries, Signal},
};
use stockscope_indicators::Macd;

use crate::crossover::{crossover_signals, strength_tier};

/// Configuration for the MACD Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdCrossoverConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl StrategyConfig for MacdCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.signal_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "MACD periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }
}

/// MACD Crossover Strategy.
pub struct MacdCrossoverStrategy {
    config: MacdCrossoverConfig,
}

impl MacdCrossoverStrategy {
    pub fn new(config: MacdCrossoverConfig) -> Self {
        Self { config }
    }
}

impl Strategy for MacdCrossoverStrategy {
    fn name(&self) -> &str {
        "macd_crossover"
    }

    fn description(&self) -> &str {
        "Signals when the MACD line crosses its signal line"
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        let macd = Macd::with_periods(
            self.config.fast_period,
            self.config.slow_period,
            self.config.signal_period,
        )?
        .calculate(series)?;

        let macd_line: Vec<Option<f64>> = macd.iter().map(|v| v.map(|o| o.macd)).collect();
        let signal_line: Vec<Option<f64>> = macd.iter().map(|v| v.map(|o| o.signal)).collect();
        let closes = series.closes();

        // Histogram size relative to price
        Ok(crossover_signals(series, self.name(), &macd_line, &signal_line, |i, m, s| {
            let magnitude = if closes[i] != 0.0 {
                ((m - s) / closes[i]).abs()
            } else {
                0.0
            };
            strength_tier(magnitude, 0.01, 0.005)
        }))
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period + self.config.signal_period
    }
}
