//! Ticker symbols.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

const MAX_SYMBOL_LEN: usize = 16;

/// A validated equity ticker.
///
/// Tickers are case-insensitive and stored upper-cased. Only ASCII
/// alphanumerics, `.` and `-` are accepted (`BRK.B`, `RDS-A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker.
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DataError::InvalidSymbol("symbol is empty".into()));
        }
        if trimmed.len() > MAX_SYMBOL_LEN {
            return Err(DataError::InvalidSymbol(format!(
                "{} is longer than {} characters",
                trimmed, MAX_SYMBOL_LEN
            )));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
        {
            return Err(DataError::InvalidSymbol(format!(
                "{} contains invalid character {:?}",
                trimmed, bad
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
