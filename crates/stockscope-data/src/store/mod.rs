//! Persisted price series keyed by symbol.

mod file;
mod memory;

pub use file::FileSeriesStore;
pub use memory::MemorySeriesStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use stockscope_core::error::StoreError;
use stockscope_core::types::{DateRange, PriceSeries, Symbol};
use tracing::warn;

/// Position of the provider that produced an entry in the configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceRole {
    Primary,
    Fallback,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Primary => f.write_str("PRIMARY"),
            SourceRole::Fallback => f.write_str("FALLBACK"),
        }
    }
}

/// Which provider produced an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUsed {
    pub role: SourceRole,
    pub provider: String,
}

/// A cached series and its provenance. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub symbol: Symbol,
    pub series: PriceSeries,
    pub fetched_at: DateTime<Utc>,
    pub source_used: SourceUsed,
    /// Range that was asked of the provider; bounds how far back the series can reach.
    pub requested: DateRange,
}

/// Storage for cache entries.
///
/// `put` replaces an entry atomically: readers see either the old or the
/// new entry, never a mix.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Prepare backing storage.
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Read an entry. Unreadable entries are reported as errors.
    async fn load(&self, symbol: &Symbol) -> Result<Option<CacheEntry>, StoreError>;

    /// Read an entry, treating any storage failure as a miss.
    async fn get(&self, symbol: &Symbol) -> Option<CacheEntry> {
        match self.load(symbol).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(symbol = %symbol, store = self.name(), error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), StoreError>;

    /// Delete one entry. Returns whether it existed.
    async fn remove(&self, symbol: &Symbol) -> Result<bool, StoreError>;

    /// Delete every entry. Returns how many were removed.
    async fn clear(&self) -> Result<usize, StoreError>;

    /// Symbols that currently have an entry, sorted.
    async fn symbols(&self) -> Result<Vec<Symbol>, StoreError>;

    /// Push buffered writes to durable storage.
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &str;
}
