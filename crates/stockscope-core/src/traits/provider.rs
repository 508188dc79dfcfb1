//! Data provider trait definition.

use crate::error::ProviderError;
use crate::types::{DateRange, PriceSeries, Symbol};
use async_trait::async_trait;
use chrono::Utc;

/// Trait for remote sources of daily price history.
///
/// Implementations classify every failure into a [`ProviderError`] kind at the
/// call site, so callers never have to inspect error text.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetch daily history.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `range` - Inclusive calendar range; only points inside it are returned
    ///
    /// # Returns
    /// A non-empty series ordered from oldest to newest
    async fn fetch(&self, symbol: &Symbol, range: &DateRange)
        -> Result<PriceSeries, ProviderError>;

    /// Check if a symbol is known to this provider.
    ///
    /// Only `SymbolNotFound` maps to `false`; transient failures are returned
    /// so the caller can tell "unknown" from "could not check".
    async fn symbol_exists(&self, symbol: &Symbol) -> Result<bool, ProviderError> {
        let today = Utc::now().date_naive();
        let range = DateRange::trailing_days(today, 10);
        match self.fetch(symbol, &range).await {
            Ok(_) => Ok(true),
            Err(ProviderError::SymbolNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get the provider name.
    fn name(&self) -> &str;
}
