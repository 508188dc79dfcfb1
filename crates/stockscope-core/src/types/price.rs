//! Daily price data types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateRange, Symbol};
use crate::error::DataError;

/// One trading day of OHLCV data.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check that every field is finite and non-negative and that
    /// `low <= open, close <= high`.
    pub fn validate(&self) -> Result<(), DataError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(DataError::InvalidSeries(format!(
                    "{} on {} is {}",
                    name, self.date, value
                )));
            }
        }

        let within = |v: f64| self.low <= v && v <= self.high;
        if !within(self.open) || !within(self.close) {
            return Err(DataError::InvalidSeries(format!(
                "{}: open {} / close {} outside low {} .. high {}",
                self.date, self.open, self.close, self.low, self.high
            )));
        }

        Ok(())
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Calculate the day's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Date-ordered daily price history for one symbol.
///
/// Dates are strictly increasing. Every constructor validates this, so a
/// `PriceSeries` obtained from this crate can be indexed by position without
/// re-checking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: Symbol,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points that are already in date order.
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Result<Self, DataError> {
        let series = Self { symbol, points };
        series.validate()?;
        Ok(series)
    }

    /// Build a series from points in any order (providers often return
    /// newest first). Duplicate dates are still rejected.
    pub fn from_unordered(symbol: Symbol, mut points: Vec<PricePoint>) -> Result<Self, DataError> {
        points.sort_by_key(|p| p.date);
        Self::new(symbol, points)
    }

    /// Re-check every invariant. Used after deserializing persisted data.
    pub fn validate(&self) -> Result<(), DataError> {
        for point in &self.points {
            point.validate()?;
        }
        for pair in self.points.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(DataError::InvalidSeries(format!(
                    "dates not strictly increasing: {} then {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(())
    }

    /// The symbol this series belongs to.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get all points as a slice.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Get a point by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    /// Get the last point.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Extract dates as a vector.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Extract high prices as a vector.
    pub fn highs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.high).collect()
    }

    /// Extract low prices as a vector.
    pub fn lows(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.low).collect()
    }

    /// Extract volumes as a vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume).collect()
    }

    /// Copy of the points that fall inside `range`. Ordering is preserved, so
    /// the result is valid by construction.
    pub fn slice(&self, range: &DateRange) -> PriceSeries {
        let points = self
            .points
            .iter()
            .filter(|p| range.contains(p.date))
            .copied()
            .collect();
        PriceSeries {
            symbol: self.symbol.clone(),
            points,
        }
    }

    /// Get an iterator over the points.
    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn point(d: u32, close: f64) -> PricePoint {
        PricePoint::new(day(d), close, close + 1.0, close - 1.0, close, 1000.0)
    }

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn test_point_calculations() {
        let p = PricePoint::new(day(2), 100.0, 110.0, 95.0, 105.0, 1_000_000.0);

        assert!((p.typical_price() - 103.333333).abs() < 0.001);
        assert!((p.range() - 15.0).abs() < 0.001);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_point_rejects_close_outside_range() {
        let p = PricePoint::new(day(2), 100.0, 101.0, 99.0, 102.0, 10.0);
        assert!(matches!(p.validate(), Err(DataError::InvalidSeries(_))));
    }

    #[test]
    fn test_point_rejects_negative_and_nan() {
        let p = PricePoint::new(day(2), 1.0, 1.0, 1.0, 1.0, -5.0);
        assert!(p.validate().is_err());

        let p = PricePoint::new(day(2), f64::NAN, 1.0, 1.0, 1.0, 5.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_series_rejects_duplicate_and_unordered_dates() {
        let dup = vec![point(2, 10.0), point(2, 11.0)];
        assert!(PriceSeries::new(symbol(), dup).is_err());

        let unordered = vec![point(3, 10.0), point(2, 11.0)];
        assert!(PriceSeries::new(symbol(), unordered.clone()).is_err());

        let sorted = PriceSeries::from_unordered(symbol(), unordered).unwrap();
        assert_eq!(sorted.dates(), vec![day(2), day(3)]);
    }

    #[test]
    fn test_series_extractions() {
        let series =
            PriceSeries::new(symbol(), vec![point(2, 100.5), point(3, 101.5)]).unwrap();

        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.highs(), vec![101.5, 102.5]);
        assert_eq!(series.volumes(), vec![1000.0, 1000.0]);
        assert_eq!(series.first_date(), Some(day(2)));
        assert_eq!(series.last_date(), Some(day(3)));
    }

    #[test]
    fn test_series_slice() {
        let series = PriceSeries::new(
            symbol(),
            vec![point(2, 1.0), point(3, 2.0), point(4, 3.0), point(5, 4.0)],
        )
        .unwrap();

        let range = DateRange::new(day(3), day(4)).unwrap();
        let sliced = series.slice(&range);
        assert_eq!(sliced.closes(), vec![2.0, 3.0]);
        assert_eq!(sliced.symbol().as_str(), "AAPL");
    }
}
