//! Moving average indicators.

use stockscope_core::error::IndicatorError;
use stockscope_core::traits::Indicator;
use stockscope_core::types::PriceSeries;

pub(crate) fn check_period(name: &str, period: usize, minimum: usize) -> Result<(), IndicatorError> {
    if period < minimum {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be at least {}, got {}",
            name, minimum, period
        )));
    }
    Ok(())
}

/// Right-aligned simple moving average over raw values.
///
/// The first `period - 1` entries are `None`. Callers must pass `period > 0`.
pub fn sma_values(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let period_f64 = period as f64;

    // Initial sum
    let mut sum: f64 = data[..period].iter().sum();
    result[period - 1] = Some(sum / period_f64);

    // Sliding window
    for i in period..data.len() {
        sum = sum - data[i - period] + data[i];
        result[i] = Some(sum / period_f64);
    }

    result
}

/// Right-aligned exponential moving average over raw values.
///
/// Seeded with the SMA of the first `period` values at index `period - 1`,
/// then `ema[i] = a * x[i] + (1 - a) * ema[i - 1]` with `a = 2 / (period + 1)`.
pub fn ema_values(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let one_minus_mult = 1.0 - multiplier;

    // Initialize with SMA
    let initial_sma: f64 = data[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(initial_sma);

    let mut ema = initial_sma;
    for (i, &price) in data.iter().enumerate().skip(period) {
        ema = price * multiplier + ema * one_minus_mult;
        result[i] = Some(ema);
    }

    result
}

/// Apply `f` to the defined tail of an aligned column and re-align the result.
///
/// Used to chain indicators (the MACD signal line is an EMA of the MACD line,
/// %D is an SMA of %K). Values must be a `None` prefix followed by defined values.
pub(crate) fn over_defined<F>(values: &[Option<f64>], f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Vec<Option<f64>>,
{
    let offset = values.iter().take_while(|v| v.is_none()).count();
    let tail: Vec<f64> = values[offset..].iter().map(|v| v.unwrap_or(f64::NAN)).collect();

    let mut result = vec![None; offset];
    result.extend(f(&tail));
    result
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N closes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("SMA", period, 1)?;
        Ok(Self { period })
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>, IndicatorError> {
        self.validate_len(series.len())?;
        Ok(sma_values(&series.closes(), self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("SMA_{}", self.period)
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("EMA", period, 1)?;
        Ok(Self { period })
    }

    /// Smoothing factor `2 / (period + 1)`.
    pub fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>, IndicatorError> {
        self.validate_len(series.len())?;
        Ok(ema_values(&series.closes(), self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("EMA_{}", self.period)
    }
}
