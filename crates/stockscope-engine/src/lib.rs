//! Query facade over price acquisition, indicators and strategies.
//!
//! [`SignalEngine`] answers the three questions callers ask: what are the
//! prices, what do the indicators say, and what does a strategy recommend.

use std::sync::Arc;
use stockscope_config::AppConfig;
use stockscope_core::error::{StockscopeError, StockscopeResult};
use stockscope_core::types::{DateRange, IndicatorSet, PriceSeries, Signal, Symbol};
use stockscope_data::{
    build_providers, AcquisitionCoordinator, Clock, FileSeriesStore, SeriesStore, SystemClock,
};
use stockscope_indicators::{compute_indicators, IndicatorSpec};
use stockscope_strategies::StrategyRegistry;
use tracing::{debug, info};

/// Serves price series, indicator sets and strategy signals for a symbol.
#[derive(Clone)]
pub struct SignalEngine {
    coordinator: AcquisitionCoordinator,
    registry: Arc<StrategyRegistry>,
}

impl SignalEngine {
    pub fn new(coordinator: AcquisitionCoordinator) -> Self {
        Self {
            coordinator,
            registry: Arc::new(StrategyRegistry::new()),
        }
    }

    /// Wire providers and a file-backed cache from configuration.
    pub async fn from_config(config: &AppConfig) -> StockscopeResult<Self> {
        let data = &config.data;
        let settings = data
            .coordinator_settings()
            .map_err(|e| StockscopeError::Config(e.to_string()))?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let providers = build_providers(&data.providers, data.request_timeout(), &clock)?;

        let store = Arc::new(FileSeriesStore::new(&data.cache_dir));
        store.init().await?;

        let coordinator = AcquisitionCoordinator::with_clock(providers, store, settings, clock)?;
        info!(
            providers = ?coordinator.provider_names(),
            cache_dir = %data.cache_dir.display(),
            "Signal engine ready"
        );
        Ok(Self::new(coordinator))
    }

    pub fn coordinator(&self) -> &AcquisitionCoordinator {
        &self.coordinator
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Flush the cache store. Call once queries are done.
    pub async fn close(&self) -> StockscopeResult<()> {
        let store = self.coordinator.store();
        store.flush().await?;
        debug!(store = store.name(), "Cache store flushed");
        Ok(())
    }

    /// Daily prices for `symbol` within `range`.
    pub async fn get_series(&self, symbol: &Symbol, range: &DateRange) -> StockscopeResult<PriceSeries> {
        Ok(self.coordinator.get_series(symbol, range).await?)
    }

    /// Indicator columns computed over the prices in `range`.
    ///
    /// An empty `specs` computes the standard set.
    pub async fn get_indicators(
        &self,
        symbol: &Symbol,
        range: &DateRange,
        specs: &[IndicatorSpec],
    ) -> StockscopeResult<IndicatorSet> {
        let standard;
        let specs = if specs.is_empty() {
            standard = IndicatorSpec::standard_set();
            &standard[..]
        } else {
            specs
        };

        let series = self.get_series(symbol, range).await?;
        debug!(symbol = %symbol, points = series.len(), indicators = specs.len(), "Computing indicators");
        Ok(compute_indicators(&series, specs)?)
    }

    /// One signal per price point in `range` from the named strategy.
    ///
    /// `params` may be partial JSON; missing fields take the strategy's
    /// defaults. Parameters are checked before any data is fetched.
    pub async fn get_signals(
        &self,
        symbol: &Symbol,
        range: &DateRange,
        strategy_name: &str,
        params: serde_json::Value,
    ) -> StockscopeResult<Vec<Signal>> {
        let strategy = self.registry.create(strategy_name, params)?;
        let series = self.get_series(symbol, range).await?;

        let signals = strategy.evaluate(&series)?;
        debug!(
            symbol = %symbol,
            strategy = strategy_name,
            actionable = signals.iter().filter(|s| s.is_actionable()).count(),
            "Evaluated strategy"
        );
        Ok(signals)
    }
}
