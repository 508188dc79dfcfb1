//! Core types and traits for stockscope.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (PricePoint, PriceSeries, Symbol, DateRange)
//! - Trading signals
//! - The error taxonomy shared by every layer
//! - Core traits for data providers, indicators and strategies

pub mod types;
pub mod traits;
pub mod error;

pub use error::{StockscopeError, StockscopeResult};
pub use types::*;
pub use traits::*;
