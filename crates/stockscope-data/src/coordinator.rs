//! Cache-or-fetch decisions for price series.
//!
//! A request is served from the store when the cached entry is fresh.
//! Otherwise the providers are tried in order (the first is the primary, the
//! rest are fallbacks) and the first success replaces the cached entry. When
//! every provider fails the last cached entry is served even if stale.
//!
//! Each symbol has a gate held from the cache check until a refreshed entry
//! is stored, so at most one fetch per symbol runs at a time and a request
//! queued behind a fetch finds its result in the store. The fetch runs as its
//! own task that owns the gate: a caller giving up never cancels it, and the
//! store is updated even when nobody is left waiting. A failed fetch is
//! remembered so requests queued behind it share the failure instead of
//! calling the providers again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use stockscope_core::error::{DataError, ProviderError};
use stockscope_core::traits::DataProvider;
use stockscope_core::types::{DateRange, PriceSeries, Symbol};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::freshness::{Freshness, FreshnessPolicy};
use crate::store::{CacheEntry, SeriesStore, SourceRole, SourceUsed};

/// Tunables for [`AcquisitionCoordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub policy: FreshnessPolicy,
    /// Calendar days of history fetched on refresh, ending today.
    pub lookback_days: u64,
    /// Upper bound on a single provider call.
    pub request_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            policy: FreshnessPolicy::default(),
            lookback_days: 365,
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// How a request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOrigin {
    CacheHit,
    Refreshed,
    /// Every provider failed; this is the last cached entry.
    StaleFallback,
}

#[derive(Debug, Clone)]
pub struct Acquired {
    pub entry: Arc<CacheEntry>,
    pub origin: AcquireOrigin,
}

#[derive(Debug, Clone)]
enum FetchFailure {
    NotFound { provider: String, detail: String },
    Exhausted { attempts: Vec<String> },
    Aborted(String),
}

impl FetchFailure {
    fn into_error(self, symbol: &Symbol) -> DataError {
        match self {
            FetchFailure::NotFound { provider, detail } => {
                DataError::SymbolNotFound(format!("{} ({}: {})", symbol, provider, detail))
            }
            FetchFailure::Exhausted { attempts } => DataError::DataUnavailable {
                symbol: symbol.to_string(),
                attempts,
            },
            FetchFailure::Aborted(reason) => DataError::DataUnavailable {
                symbol: symbol.to_string(),
                attempts: vec![format!("fetch task aborted: {}", reason)],
            },
        }
    }
}

#[derive(Debug)]
struct FailedFetch {
    /// Value of [`SymbolGate::completed`] once this fetch finished.
    seq: u64,
    window: DateRange,
    failure: FetchFailure,
}

/// Serializes cache checks and fetches for one symbol.
struct SymbolGate {
    /// Fetches finished so far.
    completed: AtomicU64,
    /// Held from the cache check until the fetch, if any, is done.
    last_failure: Arc<AsyncMutex<Option<FailedFetch>>>,
}

impl SymbolGate {
    fn new() -> Self {
        Self {
            completed: AtomicU64::new(0),
            last_failure: Arc::new(AsyncMutex::new(None)),
        }
    }
}

type GateGuard = OwnedMutexGuard<Option<FailedFetch>>;

struct Inner {
    providers: Vec<Arc<dyn DataProvider>>,
    store: Arc<dyn SeriesStore>,
    clock: Arc<dyn Clock>,
    settings: CoordinatorSettings,
    gates: Mutex<HashMap<Symbol, Arc<SymbolGate>>>,
}

/// Serves price series from the store, refreshing from providers as needed.
#[derive(Clone)]
pub struct AcquisitionCoordinator {
    inner: Arc<Inner>,
}

impl AcquisitionCoordinator {
    /// Create a coordinator on the system clock.
    ///
    /// `providers` are tried in order; the list must not be empty.
    pub fn new(
        providers: Vec<Arc<dyn DataProvider>>,
        store: Arc<dyn SeriesStore>,
        settings: CoordinatorSettings,
    ) -> Result<Self, DataError> {
        Self::with_clock(providers, store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        providers: Vec<Arc<dyn DataProvider>>,
        store: Arc<dyn SeriesStore>,
        settings: CoordinatorSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DataError> {
        if providers.is_empty() {
            return Err(DataError::Configuration(
                "at least one data provider is required".to_string(),
            ));
        }
        if settings.request_timeout.is_zero() {
            return Err(DataError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                providers,
                store,
                clock,
                settings,
                gates: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn store(&self) -> &Arc<dyn SeriesStore> {
        &self.inner.store
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.inner.providers.iter().map(|p| p.name()).collect()
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.inner.settings
    }

    /// Price history for `symbol` restricted to `range`.
    pub async fn get_series(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<PriceSeries, DataError> {
        let acquired = self.acquire(symbol, range).await?;
        Ok(acquired.entry.series.slice(range))
    }

    /// The full cache entry that can serve `range`, and how it was obtained.
    pub async fn acquire(&self, symbol: &Symbol, range: &DateRange) -> Result<Acquired, DataError> {
        let inner = &self.inner;
        let gate = inner.gate(symbol);
        let seen = gate.completed.load(Ordering::Acquire);
        let guard = Arc::clone(&gate.last_failure).lock_owned().await;

        let cached = inner.store.get(symbol).await;
        if let Some(entry) = &cached {
            match inner.settings.policy.assess(entry, inner.clock.now(), range) {
                Freshness::Fresh => {
                    debug!(symbol = %symbol, provider = %entry.source_used.provider, "Cache hit");
                    return Ok(Acquired {
                        entry: Arc::new(entry.clone()),
                        origin: AcquireOrigin::CacheHit,
                    });
                }
                Freshness::Stale(reason) => {
                    debug!(symbol = %symbol, %reason, "Cache entry stale");
                }
            }
        } else {
            debug!(symbol = %symbol, "Cache miss");
        }

        let window = self.fetch_window(range);
        // A fetch that failed while this request waited already covered its window.
        let shared = guard
            .as_ref()
            .filter(|failed| failed.seq > seen && failed.window.start <= window.start)
            .map(|failed| failed.failure.clone());
        let outcome = match shared {
            Some(failure) => {
                debug!(symbol = %symbol, "Sharing the failure of the preceding fetch");
                Err(failure)
            }
            None => self.spawn_fetch(symbol, window, gate, guard).await,
        };

        match outcome {
            Ok(entry) => Ok(Acquired {
                entry,
                origin: AcquireOrigin::Refreshed,
            }),
            Err(failure) => match cached {
                Some(entry) => {
                    warn!(
                        symbol = %symbol,
                        fetched_at = %entry.fetched_at,
                        provider = %entry.source_used.provider,
                        "All providers failed, serving stale cache entry"
                    );
                    Ok(Acquired {
                        entry: Arc::new(entry),
                        origin: AcquireOrigin::StaleFallback,
                    })
                }
                None => Err(failure.into_error(symbol)),
            },
        }
    }

    /// Run a fetch on its own task. The task keeps the gate until the store
    /// is updated, even if this caller stops waiting.
    async fn spawn_fetch(
        &self,
        symbol: &Symbol,
        window: DateRange,
        gate: Arc<SymbolGate>,
        mut guard: GateGuard,
    ) -> Result<Arc<CacheEntry>, FetchFailure> {
        let inner = Arc::clone(&self.inner);
        let task_symbol = symbol.clone();
        let handle = tokio::spawn(async move {
            let result = inner.fetch_and_store(&task_symbol, window).await;
            let seq = gate.completed.fetch_add(1, Ordering::AcqRel) + 1;
            *guard = result.as_ref().err().map(|failure| FailedFetch {
                seq,
                window,
                failure: failure.clone(),
            });
            result
        });

        handle
            .await
            .unwrap_or_else(|e| Err(FetchFailure::Aborted(e.to_string())))
    }

    /// Trailing lookback window ending today, reaching back to `range.start` if earlier.
    fn fetch_window(&self, range: &DateRange) -> DateRange {
        let today = self.inner.clock.now().date_naive();
        let trailing = DateRange::trailing_days(today, self.inner.settings.lookback_days);
        DateRange {
            start: trailing.start.min(range.start),
            end: today,
        }
    }
}

impl Inner {
    fn gate(&self, symbol: &Symbol) -> Arc<SymbolGate> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            gates
                .entry(symbol.clone())
                .or_insert_with(|| Arc::new(SymbolGate::new())),
        )
    }

    async fn fetch_and_store(
        &self,
        symbol: &Symbol,
        window: DateRange,
    ) -> Result<Arc<CacheEntry>, FetchFailure> {
        let timeout = self.settings.request_timeout;
        let mut attempts = Vec::with_capacity(self.providers.len());

        for (index, provider) in self.providers.iter().enumerate() {
            let role = if index == 0 {
                SourceRole::Primary
            } else {
                SourceRole::Fallback
            };
            let name = provider.name();

            let result = match tokio::time::timeout(timeout, provider.fetch(symbol, &window)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::NetworkError(format!(
                    "timed out after {:?}",
                    timeout
                ))),
            };

            match result {
                Ok(series) => {
                    let entry = Arc::new(CacheEntry {
                        symbol: symbol.clone(),
                        series,
                        fetched_at: self.clock.now(),
                        source_used: SourceUsed {
                            role,
                            provider: name.to_string(),
                        },
                        requested: window,
                    });

                    if let Err(e) = self.store.put(&entry).await {
                        warn!(symbol = %symbol, store = self.store.name(), error = %e, "Failed to write cache entry");
                    }
                    info!(
                        symbol = %symbol,
                        provider = name,
                        source = %role,
                        points = entry.series.len(),
                        "Refreshed price series"
                    );
                    return Ok(entry);
                }
                Err(e) if e.is_authoritative() => {
                    warn!(symbol = %symbol, provider = name, error = %e, "Symbol not found");
                    return Err(FetchFailure::NotFound {
                        provider: name.to_string(),
                        detail: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(symbol = %symbol, provider = name, source = %role, error = %e, "Provider failed");
                    attempts.push(format!("{}: {}", name, e));
                }
            }
        }

        Err(FetchFailure::Exhausted { attempts })
    }
}
