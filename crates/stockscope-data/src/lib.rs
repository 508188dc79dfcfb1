//! Price history acquisition.
//!
//! - [`providers`]: Alpha Vantage, Yahoo and local CSV sources
//! - [`store`]: cache entries on disk or in memory
//! - [`freshness`]: when a cached entry must be refreshed
//! - [`coordinator`]: cache-or-fetch with primary/fallback providers

pub mod clock;
pub mod coordinator;
pub mod freshness;
pub mod providers;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{AcquireOrigin, Acquired, AcquisitionCoordinator, CoordinatorSettings};
pub use freshness::{Freshness, FreshnessPolicy, StaleReason};
pub use providers::{Provider, ProviderConfig};
pub use store::{CacheEntry, FileSeriesStore, MemorySeriesStore, SeriesStore, SourceRole, SourceUsed};

use std::sync::Arc;
use std::time::Duration;
use stockscope_core::error::DataError;
use stockscope_core::traits::DataProvider;
use tracing::warn;

/// Build the ordered provider chain from configuration.
///
/// A provider that cannot be configured (such as Alpha Vantage without an API
/// key) is left out of the chain with a warning. It is an error only when no
/// provider remains.
pub fn build_providers(
    configs: &[ProviderConfig],
    timeout: Duration,
    clock: &Arc<dyn Clock>,
) -> Result<Vec<Arc<dyn DataProvider>>, DataError> {
    let mut providers: Vec<Arc<dyn DataProvider>> = Vec::with_capacity(configs.len());
    let mut skipped = Vec::new();

    for config in configs {
        match Provider::from_config(config, timeout, clock) {
            Ok(provider) => providers.push(Arc::new(provider)),
            Err(DataError::Configuration(reason)) => {
                warn!(provider = config.kind(), %reason, "Skipping unconfigured data provider");
                skipped.push(format!("{}: {}", config.kind(), reason));
            }
            Err(e) => return Err(e),
        }
    }

    if providers.is_empty() {
        let detail = if skipped.is_empty() {
            "none configured".to_string()
        } else {
            skipped.join("; ")
        };
        return Err(DataError::Configuration(format!(
            "no usable data provider ({})",
            detail
        )));
    }
    Ok(providers)
}
