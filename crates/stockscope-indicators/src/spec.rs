//! Indicator selection by name and batch computation into an [`IndicatorSet`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockscope_core::error::IndicatorError;
use stockscope_core::traits::Indicator;
use stockscope_core::types::{IndicatorSet, PriceSeries};

use crate::momentum::{Macd, Rsi, Stochastic};
use crate::moving_average::{Ema, Sma};
use crate::volatility::BollingerBands;

/// One requested indicator with its parameters.
///
/// Parsed from names such as `SMA_20`, `RSI`, `MACD_12_26_9`, `BB_20_2` or
/// `STOCH_14_3`. Parameters that are left out take their usual defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorSpec {
    Sma { period: usize },
    Ema { period: usize },
    Rsi { period: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    Bollinger { period: usize, k: f64 },
    Stochastic { k_period: usize, d_period: usize },
}

impl IndicatorSpec {
    /// The set computed when a caller does not ask for anything specific.
    pub fn standard_set() -> Vec<IndicatorSpec> {
        vec![
            IndicatorSpec::Sma { period: 20 },
            IndicatorSpec::Sma { period: 50 },
            IndicatorSpec::Ema { period: 12 },
            IndicatorSpec::Ema { period: 26 },
            IndicatorSpec::Rsi { period: 14 },
            IndicatorSpec::Macd { fast: 12, slow: 26, signal: 9 },
            IndicatorSpec::Bollinger { period: 20, k: 2.0 },
            IndicatorSpec::Stochastic { k_period: 14, d_period: 3 },
        ]
    }

    /// Column names this spec contributes to an [`IndicatorSet`].
    pub fn columns(&self) -> Vec<String> {
        match *self {
            IndicatorSpec::Sma { .. } | IndicatorSpec::Ema { .. } | IndicatorSpec::Rsi { .. } => {
                vec![self.to_string()]
            }
            IndicatorSpec::Macd { fast, slow, signal } => {
                let suffix = format!("{}_{}_{}", fast, slow, signal);
                vec![
                    format!("MACD_{}", suffix),
                    format!("MACD_SIGNAL_{}", suffix),
                    format!("MACD_HIST_{}", suffix),
                ]
            }
            IndicatorSpec::Bollinger { period, k } => {
                let suffix = format!("{}_{}", period, k);
                vec![
                    format!("BB_UPPER_{}", suffix),
                    format!("BB_MIDDLE_{}", suffix),
                    format!("BB_LOWER_{}", suffix),
                ]
            }
            IndicatorSpec::Stochastic { k_period, d_period } => {
                let suffix = format!("{}_{}", k_period, d_period);
                vec![format!("STOCH_K_{}", suffix), format!("STOCH_D_{}", suffix)]
            }
        }
    }

    /// Compute this indicator and add its columns to `set`.
    pub fn compute_into(&self, series: &PriceSeries, set: &mut IndicatorSet) -> Result<(), IndicatorError> {
        let columns = self.columns();
        match *self {
            IndicatorSpec::Sma { period } => {
                set.insert(columns[0].clone(), Sma::new(period)?.calculate(series)?)?;
            }
            IndicatorSpec::Ema { period } => {
                set.insert(columns[0].clone(), Ema::new(period)?.calculate(series)?)?;
            }
            IndicatorSpec::Rsi { period } => {
                set.insert(columns[0].clone(), Rsi::new(period)?.calculate(series)?)?;
            }
            IndicatorSpec::Macd { fast, slow, signal } => {
                let values = Macd::with_periods(fast, slow, signal)?.calculate(series)?;
                set.insert(columns[0].clone(), values.iter().map(|v| v.map(|o| o.macd)).collect())?;
                set.insert(columns[1].clone(), values.iter().map(|v| v.map(|o| o.signal)).collect())?;
                set.insert(columns[2].clone(), values.iter().map(|v| v.map(|o| o.histogram)).collect())?;
            }
            IndicatorSpec::Bollinger { period, k } => {
                let values = BollingerBands::with_params(period, k)?.calculate(series)?;
                set.insert(columns[0].clone(), values.iter().map(|v| v.map(|o| o.upper)).collect())?;
                set.insert(columns[1].clone(), values.iter().map(|v| v.map(|o| o.middle)).collect())?;
                set.insert(columns[2].clone(), values.iter().map(|v| v.map(|o| o.lower)).collect())?;
            }
            IndicatorSpec::Stochastic { k_period, d_period } => {
                let values = Stochastic::with_periods(k_period, d_period)?.calculate(series)?;
                set.insert(columns[0].clone(), values.iter().map(|v| v.map(|o| o.k)).collect())?;
                set.insert(columns[1].clone(), values.iter().map(|v| v.map(|o| o.d)).collect())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma { period } => write!(f, "SMA_{}", period),
            IndicatorSpec::Ema { period } => write!(f, "EMA_{}", period),
            IndicatorSpec::Rsi { period } => write!(f, "RSI_{}", period),
            IndicatorSpec::Macd { fast, slow, signal } => {
                write!(f, "MACD_{}_{}_{}", fast, slow, signal)
            }
            IndicatorSpec::Bollinger { period, k } => write!(f, "BB_{}_{}", period, k),
            IndicatorSpec::Stochastic { k_period, d_period } => {
                write!(f, "STOCH_{}_{}", k_period, d_period)
            }
        }
    }
}

fn parse_usize(spec: &str, part: &str) -> Result<usize, IndicatorError> {
    part.parse()
        .map_err(|_| IndicatorError::InvalidParameter(format!("{}: bad parameter '{}'", spec, part)))
}

impl FromStr for IndicatorSpec {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let mut parts = upper.split('_');
        let kind = parts.next().unwrap_or_default();
        let params: Vec<&str> = parts.collect();

        let arity_error = || IndicatorError::InvalidParameter(format!("{}: wrong number of parameters", s));
        let int = |i: usize, default: usize| -> Result<usize, IndicatorError> {
            params.get(i).map_or(Ok(default), |p| parse_usize(s, p))
        };

        let spec = match kind {
            "SMA" | "EMA" | "RSI" => {
                if params.len() > 1 {
                    return Err(arity_error());
                }
                match kind {
                    "SMA" => IndicatorSpec::Sma { period: int(0, 20)? },
                    "EMA" => IndicatorSpec::Ema { period: int(0, 20)? },
                    _ => IndicatorSpec::Rsi { period: int(0, 14)? },
                }
            }
            "MACD" => {
                if !(params.is_empty() || params.len() == 3) {
                    return Err(arity_error());
                }
                IndicatorSpec::Macd {
                    fast: int(0, 12)?,
                    slow: int(1, 26)?,
                    signal: int(2, 9)?,
                }
            }
            "BB" | "BOLLINGER" => {
                if params.len() > 2 {
                    return Err(arity_error());
                }
                let k = match params.get(1) {
                    Some(p) => p.parse::<f64>().map_err(|_| {
                        IndicatorError::InvalidParameter(format!("{}: bad parameter '{}'", s, p))
                    })?,
                    None => 2.0,
                };
                IndicatorSpec::Bollinger { period: int(0, 20)?, k }
            }
            "STOCH" | "STOCHASTIC" => {
                if params.len() > 2 {
                    return Err(arity_error());
                }
                IndicatorSpec::Stochastic {
                    k_period: int(0, 14)?,
                    d_period: int(1, 3)?,
                }
            }
            _ => {
                return Err(IndicatorError::InvalidParameter(format!(
                    "unknown indicator '{}'",
                    s
                )))
            }
        };

        Ok(spec)
    }
}

/// Compute every requested indicator over `series`.
///
/// Fails on the first indicator the series is too short for; the set is
/// all-or-nothing.
pub fn compute_indicators(series: &PriceSeries, specs: &[IndicatorSpec]) -> Result<IndicatorSet, IndicatorError> {
    let mut set = IndicatorSet::for_series(series);
    for spec in specs {
        spec.compute_into(series, &mut set)?;
    }
    Ok(set)
}
