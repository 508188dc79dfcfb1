//! Momentum indicators.

use serde::{Deserialize, Serialize};
use stockscope_core::error::IndicatorError;
use stockscope_core::traits::Indicator;
use stockscope_core::types::PriceSeries;

use crate::moving_average::{check_period, ema_values, over_defined, sma_values};

/// How RSI averages gains and losses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Wilder's running average: `avg = (prev_avg * (n - 1) + x) / n`.
    #[default]
    Wilder,
    /// Plain rolling mean of the last n changes.
    Simple,
}

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
}

impl Rsi {
    /// Create a new RSI indicator with Wilder smoothing.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("RSI", period, 1)?;
        Ok(Self {
            period,
            smoothing: RsiSmoothing::Wilder,
        })
    }

    pub fn with_smoothing(mut self, smoothing: RsiSmoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Calculate using Wilder's smoothing method.
    fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
        if values.len() < period {
            return vec![];
        }

        let mut result = Vec::with_capacity(values.len() - period + 1);
        let period_f64 = period as f64;

        // Initial average
        let mut avg: f64 = values[..period].iter().sum::<f64>() / period_f64;
        result.push(avg);

        for &value in &values[period..] {
            avg = (avg * (period_f64 - 1.0) + value) / period_f64;
            result.push(avg);
        }

        result
    }

    fn simple_smooth(values: &[f64], period: usize) -> Vec<f64> {
        sma_values(values, period).into_iter().flatten().collect()
    }

    /// RSI over raw closes, aligned with `data`.
    pub fn values(&self, data: &[f64]) -> Vec<Option<f64>> {
        let mut result = vec![None; data.len()];
        if data.len() <= self.period {
            return result;
        }

        let mut gains = Vec::with_capacity(data.len() - 1);
        let mut losses = Vec::with_capacity(data.len() - 1);

        for pair in data.windows(2) {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        let (avg_gains, avg_losses) = match self.smoothing {
            RsiSmoothing::Wilder => (
                Self::wilder_smooth(&gains, self.period),
                Self::wilder_smooth(&losses, self.period),
            ),
            RsiSmoothing::Simple => (
                Self::simple_smooth(&gains, self.period),
                Self::simple_smooth(&losses, self.period),
            ),
        };

        // First average covers changes 1..=period, i.e. ends at close index `period`.
        for (i, (&gain, &loss)) in avg_gains.iter().zip(avg_losses.iter()).enumerate() {
            let rsi = if loss == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + gain / loss))
            };
            result[self.period + i] = Some(rsi.clamp(0.0, 100.0));
        }

        result
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>, IndicatorError> {
        self.validate_len(series.len())?;
        Ok(self.values(&series.closes()))
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> String {
        format!("RSI_{}", self.period)
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum. Outputs are
/// defined from index `slow + signal - 2`.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a MACD with default parameters (12, 26, 9).
    pub fn standard() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        check_period("MACD fast", fast, 1)?;
        check_period("MACD slow", slow, 1)?;
        check_period("MACD signal", signal, 1)?;
        if fast >= slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD fast period ({}) must be less than slow period ({})",
                fast, slow
            )));
        }
        Ok(Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        })
    }

    pub fn periods(&self) -> (usize, usize, usize) {
        (self.fast_period, self.slow_period, self.signal_period)
    }

    /// MACD line over raw closes (defined from index `slow - 1`).
    pub fn macd_line(&self, data: &[f64]) -> Vec<Option<f64>> {
        let fast = ema_values(data, self.fast_period);
        let slow = ema_values(data, self.slow_period);

        fast.iter()
            .zip(slow.iter())
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect()
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::standard()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<MacdOutput>>, IndicatorError> {
        self.validate_len(series.len())?;

        let macd_line = self.macd_line(&series.closes());
        let signal_line = over_defined(&macd_line, |d| ema_values(d, self.signal_period));

        Ok(macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(m, s)| {
                let (macd, signal) = ((*m)?, (*s)?);
                Some(MacdOutput {
                    macd,
                    signal,
                    histogram: macd - signal,
                })
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    fn name(&self) -> String {
        format!(
            "MACD_{}_{}_{}",
            self.fast_period, self.slow_period, self.signal_period
        )
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K (fast stochastic)
    pub k: f64,
    /// %D (SMA of %K)
    pub d: f64,
}

/// Stochastic oscillator.
///
/// Compares closing price to the high/low range over a period.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a stochastic oscillator with default parameters (14, 3).
    pub fn standard() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }

    /// Create with custom periods.
    pub fn with_periods(k_period: usize, d_period: usize) -> Result<Self, IndicatorError> {
        check_period("Stochastic %K", k_period, 1)?;
        check_period("Stochastic %D", d_period, 1)?;
        Ok(Self { k_period, d_period })
    }

    pub fn periods(&self) -> (usize, usize) {
        (self.k_period, self.d_period)
    }

    /// Raw %K from OHLC columns, aligned with the shortest input.
    pub fn percent_k(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Option<f64>> {
        let len = high.len().min(low.len()).min(close.len());
        let mut k_values = vec![None; len];
        if len < self.k_period {
            return k_values;
        }

        for i in (self.k_period - 1)..len {
            let start = i + 1 - self.k_period;
            let highest = high[start..=i]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let lowest = low[start..=i]
                .iter()
                .cloned()
                .fold(f64::INFINITY, f64::min);

            let range = highest - lowest;
            let k = if range == 0.0 {
                50.0 // Undefined, use midpoint
            } else {
                ((close[i] - lowest) / range) * 100.0
            };
            k_values[i] = Some(k.clamp(0.0, 100.0));
        }

        k_values
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::standard()
    }
}

impl Indicator for Stochastic {
    type Output = StochasticOutput;

    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<StochasticOutput>>, IndicatorError> {
        self.validate_len(series.len())?;

        let k_values = self.percent_k(&series.highs(), &series.lows(), &series.closes());
        let d_values = over_defined(&k_values, |d| sma_values(d, self.d_period));

        Ok(k_values
            .iter()
            .zip(d_values.iter())
            .map(|(k, d)| {
                Some(StochasticOutput {
                    k: (*k)?,
                    d: (*d)?,
                })
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn name(&self) -> String {
        format!("STOCH_{}_{}", self.k_period, self.d_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{series_from_closes, series_from_ohlc};

    fn defined_prefix<T>(values: &[Option<T>]) -> usize {
        values.iter().take_while(|v| v.is_none()).count()
    }

    #[test]
    fn test_rsi_basic() {
        let rsi = Rsi::new(14).unwrap();
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&series_from_closes(&data)).unwrap();
        assert_eq!(result.len(), 30);
        assert_eq!(defined_prefix(&result), 14);

        for value in result.iter().flatten() {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let rsi = Rsi::new(5).unwrap();
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let result = rsi.calculate(&series_from_closes(&data)).unwrap();

        // Zero average loss = RSI should be 100
        assert!((result[5].unwrap() - 100.0).abs() < 1e-10);
        assert!((result[6].unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_flat_prices() {
        let rsi = Rsi::new(3).unwrap();
        let result = rsi.calculate(&series_from_closes(&[5.0; 6])).unwrap();

        assert_eq!(result[3], Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::new(5).unwrap();
        let data = vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let result = rsi.calculate(&series_from_closes(&data)).unwrap();

        assert!(result[5].unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_rsi_wilder_vs_simple() {
        // changes: +2, -1, +2, -1, +4
        let data = vec![10.0, 12.0, 11.0, 13.0, 12.0, 16.0];
        let series = series_from_closes(&data);

        let wilder = Rsi::new(4).unwrap().calculate(&series).unwrap();
        let simple = Rsi::new(4)
            .unwrap()
            .with_smoothing(RsiSmoothing::Simple)
            .calculate(&series)
            .unwrap();

        // Both seed from the first four changes: gain 1.0, loss 0.5
        let seed = 100.0 - 100.0 / (1.0 + 1.0 / 0.5);
        assert!((wilder[4].unwrap() - seed).abs() < 1e-10);
        assert!((simple[4].unwrap() - seed).abs() < 1e-10);

        // Wilder: gain (1.0*3 + 4)/4 = 1.75, loss (0.5*3 + 0)/4 = 0.375
        let expected_wilder = 100.0 - 100.0 / (1.0 + 1.75 / 0.375);
        assert!((wilder[5].unwrap() - expected_wilder).abs() < 1e-10);

        // Simple: last four changes -1, +2, -1, +4 -> gain 1.5, loss 0.5
        let expected_simple = 100.0 - 100.0 / (1.0 + 1.5 / 0.5);
        assert!((simple[5].unwrap() - expected_simple).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_insufficient_history() {
        let rsi = Rsi::new(14).unwrap();
        let err = rsi.calculate(&series_from_closes(&[1.0; 14])).unwrap_err();

        assert_eq!(
            err,
            IndicatorError::InsufficientHistory {
                indicator: "RSI_14".into(),
                required: 15,
                available: 14,
            }
        );
    }

    #[test]
    fn test_macd_basic() {
        let macd = Macd::standard();
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = macd.calculate(&series_from_closes(&data)).unwrap();

        assert_eq!(result.len(), 50);
        assert_eq!(defined_prefix(&result), 26 + 9 - 2);
        // In an uptrend, MACD should be positive
        assert!(result.last().unwrap().unwrap().macd > 0.0);
    }

    #[test]
    fn test_macd_histogram() {
        let macd = Macd::with_periods(3, 6, 4).unwrap();
        let data: Vec<f64> = (0..30)
            .map(|i| 50.0 + (i as f64 * 0.4).cos() * 3.0)
            .collect();
        let result = macd.calculate(&series_from_closes(&data)).unwrap();

        assert_eq!(defined_prefix(&result), 6 + 4 - 2);
        for out in result.iter().flatten() {
            assert!((out.histogram - (out.macd - out.signal)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_macd_invalid_periods() {
        assert!(matches!(
            Macd::with_periods(26, 12, 9),
            Err(IndicatorError::InvalidParameter(_))
        ));
        assert!(matches!(
            Macd::with_periods(12, 26, 0),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_macd_minimum_length() {
        let macd = Macd::with_periods(5, 10, 3).unwrap();
        assert!(macd.calculate(&series_from_closes(&[1.0; 11])).is_err());

        let result = macd.calculate(&series_from_closes(&[1.0; 12])).unwrap();
        assert!(result[11].is_some());
    }

    #[test]
    fn test_stochastic_basic() {
        let stoch = Stochastic::standard();
        let high: Vec<f64> = (0..30).map(|i| 105.0 + i as f64).collect();
        let low: Vec<f64> = (0..30).map(|i| 95.0 + i as f64).collect();
        let close: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();

        let result = stoch.calculate(&series_from_ohlc(&high, &low, &close)).unwrap();
        assert_eq!(defined_prefix(&result), 14 + 3 - 2);

        for output in result.iter().flatten() {
            assert!(output.k >= 0.0 && output.k <= 100.0);
            assert!(output.d >= 0.0 && output.d <= 100.0);
        }
    }

    #[test]
    fn test_stochastic_at_high() {
        let stoch = Stochastic::with_periods(5, 3).unwrap();
        // Close at highs
        let high = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0];
        let low = vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let close = high.clone();

        let result = stoch.calculate(&series_from_ohlc(&high, &low, &close)).unwrap();

        // Close at high = %K should be 100
        assert!((result.last().unwrap().unwrap().k - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_stochastic_flat_range() {
        let stoch = Stochastic::with_periods(4, 2).unwrap();
        let result = stoch.calculate(&series_from_closes(&[42.0; 8])).unwrap();

        for output in result.iter().flatten() {
            assert_eq!(output.k, 50.0);
            assert_eq!(output.d, 50.0);
        }
        assert!(result[4].is_some());
    }

    #[test]
    fn test_stochastic_d_is_sma_of_k() {
        let stoch = Stochastic::with_periods(3, 2).unwrap();
        let high = vec![10.0, 12.0, 11.0, 14.0, 13.0, 15.0];
        let low = vec![8.0, 9.0, 9.0, 10.0, 11.0, 12.0];
        let close = vec![9.0, 11.0, 10.0, 13.0, 12.0, 14.0];

        let series = series_from_ohlc(&high, &low, &close);
        let result = stoch.calculate(&series).unwrap();
        let k = stoch.percent_k(&high, &low, &close);

        for i in 3..6 {
            let expected = (k[i].unwrap() + k[i - 1].unwrap()) / 2.0;
            assert!((result[i].unwrap().d - expected).abs() < 1e-10);
        }
    }
}
