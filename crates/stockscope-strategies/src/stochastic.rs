//! Stochastic Oscillator Strategy.
//!
//! Buys when %K crosses above %D inside the oversold zone and sells when
//! %K crosses below %D inside the overbought zone.

use serde::{Deserialize, Serialize};
use stockscope_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{PriceSeries, Signal},
};
use stockscope_indicators::Stochastic;

use crate::crossover::{detect_cross, Cross};

/// Configuration for the Stochastic strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochasticConfig {
    /// %K lookback period
    pub k_period: usize,
    /// %D smoothing period
    pub d_period: usize,
    /// %K must be below this for a BUY
    pub oversold: f64,
    /// %K must be above this for a SELL
    pub overbought: f64,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

impl StrategyConfig for StochasticConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.k_period == 0 || self.d_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Stochastic periods must be greater than 0".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Stochastic thresholds must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// Stochastic Oscillator Strategy.
pub struct StochasticStrategy {
    config: StochasticConfig,
}

impl StochasticStrategy {
    pub fn new(config: StochasticConfig) -> Self {
        Self { config }
    }

    /// Deeper into the zone means a stronger signal.
    fn zone_strength(depth: f64, zone_width: f64) -> f64 {
        if zone_width > 0.0 {
            0.5 + 0.5 * (depth / zone_width)
        } else {
            0.5
        }
    }
}

impl Strategy for StochasticStrategy {
    fn name(&self) -> &str {
        "stochastic"
    }

    fn description(&self) -> &str {
        "Signals on %K/%D crosses in the oversold or overbought zone"
    }

    fn evaluate(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError> {
        let values = Stochastic::with_periods(self.config.k_period, self.config.d_period)?
            .calculate(series)?;
        let (oversold, overbought) = (self.config.oversold, self.config.overbought);

        Ok(series
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let pair = (i > 0).then(|| Some((values[i - 1]?, values[i]?))).flatten();
                let Some((prev, cur)) = pair else {
                    return Signal::hold(point.date, self.name());
                };

                match detect_cross(prev.k, prev.d, cur.k, cur.d) {
                    Cross::Above if cur.k < oversold => Signal::buy(
                        point.date,
                        self.name(),
                        Self::zone_strength(oversold - cur.k, oversold),
                    ),
                    Cross::Below if cur.k > overbought => Signal::sell(
                        point.date,
                        self.name(),
                        Self::zone_strength(cur.k - overbought, 100.0 - overbought),
                    ),
                    _ => Signal::hold(point.date, self.name()),
                }
            })
            .collect())
    }

    fn warmup_period(&self) -> usize {
        self.config.k_period + self.config.d_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{series_from_closes, series_from_ohlc};
    use stockscope_core::types::SignalAction;

    fn strategy() -> StochasticStrategy {
        StochasticStrategy::new(StochasticConfig {
            k_period: 5,
            d_period: 3,
            ..Default::default()
        })
    }

    #[test]
    fn test_config_validation() {
        assert!(StochasticConfig::default().validate().is_ok());

        let config = StochasticConfig {
            oversold: 90.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buy_on_oversold_cross() {
        // Slide to the bottom of the range, close on the lows, then tick up.
        let close = vec![20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 14.0, 13.0, 12.0, 12.4];
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let mut low: Vec<f64> = close.iter().map(|c| c - 0.5).collect();
        low[7] = 12.8;
        low[8] = 12.0;

        let signals = strategy()
            .evaluate(&series_from_ohlc(&high, &low, &close))
            .unwrap();

        assert_eq!(signals[9].action, SignalAction::Buy);
        assert!(signals[..9].iter().all(|s| s.action == SignalAction::Hold));
    }

    #[test]
    fn test_sell_on_overbought_cross() {
        let close = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 17.6];
        let mut high: Vec<f64> = close.iter().map(|c| c + 0.5).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        high[7] = 17.2;
        high[8] = 18.0;

        let signals = strategy()
            .evaluate(&series_from_ohlc(&high, &low, &close))
            .unwrap();

        assert_eq!(signals[9].action, SignalAction::Sell);
        assert!(signals.iter().all(|s| s.action != SignalAction::Buy));
    }

    #[test]
    fn test_flat_prices_hold() {
        let signals = strategy()
            .evaluate(&series_from_closes(&[30.0; 15]))
            .unwrap();

        assert!(signals.iter().all(|s| s.action == SignalAction::Hold));
    }
}
