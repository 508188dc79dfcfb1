//! RSI-based Strategy.
//!
//! Buys when RSI climbs back above the oversold level,
//! sells when RSI falls back below the overbought level.

use serde::{Deserialize, Serialize};
use stockscope_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{PriceSeries, Signal},
};
use stockscope_indicators::Rsi;

/// Configuration for the RSI strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiConfig {
    /// RSI calculation period
    pub period: usize,
    /// Overbought threshold (sell when RSI falls back through it)
    pub overbought: f64,
    /// Oversold threshold (buy when RSI climbs back through it)
    pub oversold: f64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl StrategyConfig for RsiConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// RSI-based Strategy.
pub struct RsiStrategy {
    config: RsiConfig,
}

impl RsiStrategy {
    pub fn new(config: RsiConfig) -> Self {
        Self { config }
    }

    /// Higher confidence the deeper the previous reading sat in the extreme zone.
    fn calculate_confidence(&self, prev_rsi: f64) -> f64 {
        if prev_rsi <= self.config.oversold - 10.0 || prev_rsi >= self.config.overbought + 10.0 {
            0.9
        } else if prev_rsi <= self.config.oversold - 5.0 || prev_rsi >= self.config.overbought + 5.0 {
            0.7
        } else {
            0.5
        }
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        "rsi"
    }

    fn description(&self) -> &str {
        "Signals when RSI leaves the oversold or overbought zone"
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        let rsi = Rsi::new(self.config.period)?.calculate(series)?;
        let (oversold, overbought) = (self.config.oversold, self.config.overbought);

        Ok(series
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let pair = (i > 0).then(|| Some((rsi[i - 1]?, rsi[i]?))).flatten();
                match pair {
                    Some((prev, cur)) if prev < oversold && cur >= oversold => {
                        Signal::buy(point.date, self.name(), self.calculate_confidence(prev))
                    }
                    Some((prev, cur)) if prev > overbought && cur <= overbought => {
                        Signal::sell(point.date, self.name(), self.calculate_confidence(prev))
                    }
                    _ => Signal::hold(point.date, self.name()),
                }
            })
            .collect())
    }

    fn warmup_period(&self) -> usize {
        self.config.period + 2
    }
}
