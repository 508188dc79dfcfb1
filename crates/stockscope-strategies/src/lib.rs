//! Signal-generating strategies.
//!
//! This crate provides the built-in strategies:
//! - SMA Crossover
//! - RSI oversold/overbought reversals
//! - MACD signal-line crossover
//! - Bollinger Bands re-entry
//! - Stochastic %K/%D crossover
//!
//! Each strategy evaluates a whole price series and returns one signal per
//! point. Strategies are independent; nothing here combines them.

mod bollinger;
pub mod crossover;
mod macd_crossover;
mod registry;
mod rsi_strategy;
mod sma_crossover;
mod stochastic;

pub use bollinger::{BollingerConfig, BollingerStrategy};
pub use macd_crossover::{MacdCrossoverConfig, MacdCrossoverStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use rsi_strategy::{RsiConfig, RsiStrategy};
pub use sma_crossover::{SmaCrossoverConfig, SmaCrossoverStrategy};
pub use stochastic::{StochasticConfig, StochasticStrategy};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Days, NaiveDate};
    use stockscope_core::types::{PricePoint, PriceSeries, Symbol};

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(i as u64)
    }

    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(day(i), c, c, c, c, 1_000.0))
            .collect();
        PriceSeries::new(Symbol::parse("TEST").unwrap(), points).unwrap()
    }

    pub fn series_from_ohlc(high: &[f64], low: &[f64], close: &[f64]) -> PriceSeries {
        let points = (0..close.len())
            .map(|i| PricePoint::new(day(i), close[i], high[i], low[i], close[i], 1_000.0))
            .collect();
        PriceSeries::new(Symbol::parse("TEST").unwrap(), points).unwrap()
    }
}
