//! Core traits for stockscope.

mod indicator;
mod provider;
mod strategy;

pub use indicator::Indicator;
pub use provider::DataProvider;
pub use strategy::{Strategy, StrategyConfig};
