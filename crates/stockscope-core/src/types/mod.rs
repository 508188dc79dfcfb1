//! Core data types for stockscope.

mod indicator_set;
mod price;
mod range;
mod signal;
mod symbol;

pub use indicator_set::IndicatorSet;
pub use price::{PricePoint, PriceSeries};
pub use range::DateRange;
pub use signal::{Signal, SignalAction};
pub use symbol::Symbol;
