//! Error types for stockscope.

use thiserror::Error;

/// Top-level stockscope error.
#[derive(Error, Debug)]
pub enum StockscopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failure kinds reported by a single data provider call.
///
/// The payload is a human readable detail; callers branch on the variant only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// `SymbolNotFound` is authoritative; every other kind is transient and
    /// may be retried against the next provider.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, ProviderError::SymbolNotFound(_))
    }
}

/// Data acquisition errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Data unavailable for {symbol} ({})", .attempts.join("; "))]
    DataUnavailable {
        symbol: String,
        attempts: Vec<String>,
    },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Series store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persisted entry exists but cannot be trusted. Readers treat this as a miss.
    #[error("Cache entry for {symbol} is corrupt: {reason}")]
    Corrupt { symbol: String, reason: String },

    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient history for {indicator}: need {required} points, have {available}")]
    InsufficientHistory {
        indicator: String,
        required: usize,
        available: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Result type alias for stockscope operations.
pub type StockscopeResult<T> = Result<T, StockscopeError>;
