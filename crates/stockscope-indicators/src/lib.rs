//! Technical indicators over daily price series.
//!
//! This crate provides implementations of common technical indicators:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD, Stochastic)
//! - Volatility indicators (Bollinger Bands)
//!
//! Every indicator returns one value per series point. Points without enough
//! history are `None`; a series shorter than an indicator's window is rejected
//! with `InsufficientHistory`.

pub mod momentum;
pub mod moving_average;
pub mod spec;
pub mod volatility;

pub use momentum::{Macd, MacdOutput, Rsi, RsiSmoothing, Stochastic, StochasticOutput};
pub use moving_average::{ema_values, sma_values, Ema, Sma};
pub use spec::{compute_indicators, IndicatorSpec};
pub use volatility::{sample_std_dev, BollingerBands, BollingerOutput};
