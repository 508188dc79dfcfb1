//! Indicator trait definitions.

use crate::error::IndicatorError;
use crate::types::PriceSeries;

/// Trait for technical indicators.
///
/// Indicators process a price series and produce one value per point,
/// aligned index-for-index with the input. Leading points without enough
/// history are `None`.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output: Copy;

    /// Calculate indicator values for the given series.
    ///
    /// # Returns
    /// A vector with exactly `series.len()` entries, or
    /// `InsufficientHistory` when the series is shorter than [`Indicator::period`].
    fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<Self::Output>>, IndicatorError>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Column name of the indicator, including its parameters (e.g. `SMA_20`).
    fn name(&self) -> String;

    /// Validate that there's enough data.
    fn validate_len(&self, available: usize) -> Result<(), IndicatorError> {
        if available < self.period() {
            return Err(IndicatorError::InsufficientHistory {
                indicator: self.name(),
                required: self.period(),
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PricePoint, Symbol};
    use chrono::{Days, NaiveDate};

    struct RollingSum {
        period: usize,
    }

    impl Indicator for RollingSum {
        type Output = f64;

        fn calculate(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>, IndicatorError> {
            self.validate_len(series.len())?;
            let closes = series.closes();
            let mut out = vec![None; self.period - 1];
            out.extend(closes.windows(self.period).map(|w| Some(w.iter().sum())));
            Ok(out)
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> String {
            format!("SUM_{}", self.period)
        }
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PricePoint::new(start + Days::new(i as u64), c, c, c, c, 1.0)
            })
            .collect();
        PriceSeries::new(Symbol::parse("TEST").unwrap(), points).unwrap()
    }

    #[test]
    fn test_indicator_validation() {
        let indicator = RollingSum { period: 5 };

        let err = indicator.validate_len(3).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientHistory {
                indicator: "SUM_5".into(),
                required: 5,
                available: 3,
            }
        );
        assert!(indicator.validate_len(5).is_ok());
    }

    #[test]
    fn test_indicator_alignment() {
        let indicator = RollingSum { period: 3 };
        let result = indicator.calculate(&series(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert!((result[2].unwrap() - 6.0).abs() < 0.001); // 1+2+3
        assert!((result[4].unwrap() - 12.0).abs() < 0.001); // 3+4+5
    }
}
