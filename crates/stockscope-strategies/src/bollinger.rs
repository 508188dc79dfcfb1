//! Bollinger Bands Strategy.
//!
//! Buys when the close re-enters the bands from below the lower band and
//! sells when it re-enters from above the upper band.

use serde::{Deserialize, Serialize};
use stockscope_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{PriceSeries, Signal},
};
use stockscope_indicators::{BollingerBands, BollingerOutput};

/// Configuration for the Bollinger Bands strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BollingerConfig {
    /// Bollinger Bands period
    pub period: usize,
    /// Number of standard deviations for bands
    pub std_dev: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl StrategyConfig for BollingerConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "Period must be at least 2".into(),
            ));
        }
        if !(self.std_dev.is_finite() && self.std_dev > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Standard deviation must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Bollinger Bands Strategy.
pub struct BollingerStrategy {
    config: BollingerConfig,
}

impl BollingerStrategy {
    pub fn new(config: BollingerConfig) -> Self {
        Self { config }
    }

    /// How far outside the band the previous close was, in band widths.
    fn excursion_strength(band: &BollingerOutput, distance: f64) -> f64 {
        let width = band.upper - band.lower;
        if width > 0.0 {
            0.5 + distance / width
        } else {
            0.5
        }
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &str {
        "bollinger_bands"
    }

    fn description(&self) -> &str {
        "Signals when the close returns inside the Bollinger Bands"
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        let bands = BollingerBands::with_params(self.config.period, self.config.std_dev)?
            .calculate(series)?;
        let closes = series.closes();

        Ok(series
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let pair = (i > 0).then(|| Some((bands[i - 1]?, bands[i]?))).flatten();
                let Some((prev_band, band)) = pair else {
                    return Signal::hold(point.date, self.name());
                };
                let (prev_close, close) = (closes[i - 1], closes[i]);

                if prev_close < prev_band.lower && close >= band.lower {
                    let strength = Self::excursion_strength(&prev_band, prev_band.lower - prev_close);
                    Signal::buy(point.date, self.name(), strength)
                } else if prev_close > prev_band.upper && close <= band.upper {
                    let strength = Self::excursion_strength(&prev_band, prev_close - prev_band.upper);
                    Signal::sell(point.date, self.name(), strength)
                } else {
                    Signal::hold(point.date, self.name())
                }
            })
            .collect())
    }

    fn warmup_period(&self) -> usize {
        self.config.period + 1
    }
}
