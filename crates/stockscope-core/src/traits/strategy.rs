//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{PriceSeries, Signal};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// A strategy turns a complete price series into one signal per point.
/// The decision at index `i` may only use data at or before `i`; strategies
/// are stateless between calls and can be evaluated in isolation.
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Evaluate the whole series.
    ///
    /// # Returns
    /// Exactly `series.len()` signals, HOLD wherever no rule fires or the
    /// underlying indicators are still undefined.
    fn evaluate(&self, series: &PriceSeries) -> Result<Vec<Signal>, StrategyError>;

    /// Get the warmup period (number of points needed before any BUY/SELL is possible).
    fn warmup_period(&self) -> usize;

    /// Check if the strategy is warmed up (has enough data).
    fn is_warmed_up(&self, points_available: usize) -> bool {
        points_available >= self.warmup_period()
    }

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}
