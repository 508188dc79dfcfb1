//! Volatility indicators.

use serde::{Deserialize, Serialize};
use stockscope_core::error::IndicatorError;
use stockscope_core::traits::Indicator;
use stockscope_core::types::PriceSeries;

use crate::moving_average::check_period;

/// Rolling sample standard deviation (n - 1 denominator), aligned with `data`.
pub fn sample_std_dev(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period < 2 || data.len() < period {
        return result;
    }

    let period_f64 = period as f64;
    for (i, window) in data.windows(period).enumerate() {
        let mean: f64 = window.iter().sum::<f64>() / period_f64;
        let variance: f64 =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period_f64 - 1.0);
        result[period - 1 + i] = Some(variance.sqrt());
    }

    result
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
    /// Bandwidth ((upper - lower) / middle)
    pub bandwidth: f64,
    /// %B ((price - lower) / (upper - lower))
    pub percent_b: f64,
}

impl BollingerOutput {
    /// Check if price is above upper band.
    pub fn is_overbought(&self, price: f64) -> bool {
        price > self.upper
    }

    /// Check if price is below lower band.
    pub fn is_oversold(&self, price: f64) -> bool {
        price < self.lower
    }
}

/// Bollinger Bands.
///
/// Consists of a middle band (SMA) with upper and lower bands
/// at a specified number of sample standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create Bollinger Bands with default parameters (20, 2.0).
    pub fn standard() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Result<Self, IndicatorError> {
        check_period("Bollinger", period, 2)?;
        if !(std_dev_multiplier.is_finite() && std_dev_multiplier > 0.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "Bollinger multiplier must be positive, got {}",
                std_dev_multiplier
            )));
        }
        Ok(Self {
            period,
            std_dev_multiplier,
        })
    }

    pub fn multiplier(&self) -> f64 {
        self.std_dev_multiplier
    }

    /// Bands over raw closes, aligned with `data`.
    pub fn values(&self, data: &[f64]) -> Vec<Option<BollingerOutput>> {
        let mut result = vec![None; data.len()];
        if data.len() < self.period {
            return result;
        }

        let period_f64 = self.period as f64;
        let std_devs = sample_std_dev(data, self.period);

        for (i, window) in data.windows(self.period).enumerate() {
            let idx = self.period - 1 + i;
            let mean: f64 = window.iter().sum::<f64>() / period_f64;
            let std_dev = std_devs[idx].unwrap_or(0.0);

            let upper = mean + self.std_dev_multiplier * std_dev;
            let lower = mean - self.std_dev_multiplier * std_dev;

            let bandwidth = if mean != 0.0 {
                (upper - lower) / mean
            } else {
                0.0
            };

            let price = data[idx];
            let percent_b = if upper != lower {
                (price - lower) / (upper - lower)
            } else {
                0.5
            };

            result[idx] = Some(BollingerOutput {
                upper,
                middle: mean,
                lower,
                bandwidth,
                percent_b,
            });
        }

        result
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::standard()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerOutput;

    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<BollingerOutput>>, IndicatorError> {
        self.validate_len(series.len())?;
        Ok(self.values(&series.closes()))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("BB_{}_{}", self.period, self.std_dev_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_closes;

    #[test]
    fn test_sample_std_dev() {
        let data = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let result = sample_std_dev(&data, 3);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_none() && result[1].is_none());
        // First window: [2, 4, 6], mean = 4, variance = (4+0+4)/2 = 4
        assert!((result[2].unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_bollinger_bands() {
        let bb = BollingerBands::with_params(5, 2.0).unwrap();
        let data: Vec<f64> = (0..20)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect();

        let result = bb.calculate(&series_from_closes(&data)).unwrap();
        assert_eq!(result.len(), 20);
        assert_eq!(result.iter().take_while(|v| v.is_none()).count(), 4);

        for output in result.iter().flatten() {
            assert!(output.upper > output.middle);
            assert!(output.middle > output.lower);
        }
    }

    #[test]
    fn test_bollinger_uses_sample_sigma() {
        let bb = BollingerBands::with_params(4, 2.0).unwrap();
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let out = bb.calculate(&series_from_closes(&data)).unwrap()[3].unwrap();

        // mean 2.5, squared deviations sum 5.0, sample variance 5/3
        let sigma = (5.0_f64 / 3.0).sqrt();
        assert!((out.middle - 2.5).abs() < 1e-10);
        assert!((out.upper - (2.5 + 2.0 * sigma)).abs() < 1e-10);
        assert!((out.lower - (2.5 - 2.0 * sigma)).abs() < 1e-10);
    }

    #[test]
    fn test_bollinger_flat_prices() {
        let bb = BollingerBands::with_params(3, 2.0).unwrap();
        let result = bb.calculate(&series_from_closes(&[10.0; 5])).unwrap();
        let out = result[4].unwrap();

        assert_eq!(out.upper, out.lower);
        assert_eq!(out.percent_b, 0.5);
    }

    #[test]
    fn test_bollinger_overbought_oversold() {
        let output = BollingerOutput {
            upper: 110.0,
            middle: 100.0,
            lower: 90.0,
            bandwidth: 0.2,
            percent_b: 0.5,
        };

        assert!(output.is_overbought(115.0));
        assert!(!output.is_overbought(105.0));
        assert!(output.is_oversold(85.0));
        assert!(!output.is_oversold(95.0));
    }

    #[test]
    fn test_bollinger_invalid_params() {
        assert!(BollingerBands::with_params(1, 2.0).is_err());
        assert!(BollingerBands::with_params(20, 0.0).is_err());
        assert!(BollingerBands::with_params(20, f64::NAN).is_err());
    }
}
