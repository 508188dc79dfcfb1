//! Named, aligned indicator columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PriceSeries, Symbol};
use crate::error::IndicatorError;

/// Indicator columns computed from one price series.
///
/// Every column has exactly one entry per series point; `None` marks points
/// where the indicator window has insufficient history. The series dates are
/// kept alongside so a set can be checked against the series it is used with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    symbol: Symbol,
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorSet {
    /// Create an empty set aligned with `series`.
    pub fn for_series(series: &PriceSeries) -> Self {
        Self {
            symbol: series.symbol().clone(),
            dates: series.dates(),
            columns: BTreeMap::new(),
        }
    }

    /// Add (or replace) a column. The column length must match the series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<(), IndicatorError> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(IndicatorError::InvalidParameter(format!(
                "column {} has {} values for {} dates",
                name,
                values.len(),
                self.dates.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows (series points).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at row `index`, if both exist and the value is defined.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.columns.get(name)?.get(index).copied().flatten()
    }

    /// Column names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> &BTreeMap<String, Vec<Option<f64>>> {
        &self.columns
    }

    /// True when this set was derived from a series with exactly these dates.
    /// A reordered, gapped or extended series requires recomputation.
    pub fn is_aligned_with(&self, series: &PriceSeries) -> bool {
        self.symbol == *series.symbol()
            && self.dates.len() == series.len()
            && self.dates.iter().zip(series.iter()).all(|(d, p)| *d == p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::Days;

    fn series(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..n)
            .map(|i| PricePoint::new(start + Days::new(i as u64), 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();
        PriceSeries::new(Symbol::parse("ACME").unwrap(), points).unwrap()
    }

    #[test]
    fn test_insert_checks_length() {
        let s = series(3);
        let mut set = IndicatorSet::for_series(&s);

        assert!(set.insert("SMA_2", vec![None, Some(1.0), Some(1.0)]).is_ok());
        assert!(set.insert("SMA_9", vec![None]).is_err());

        assert_eq!(set.len(), 3);
        assert_eq!(set.value("SMA_2", 0), None);
        assert_eq!(set.value("SMA_2", 2), Some(1.0));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["SMA_2"]);
    }

    #[test]
    fn test_alignment_detects_different_series() {
        let s = series(3);
        let set = IndicatorSet::for_series(&s);

        assert!(set.is_aligned_with(&s));
        assert!(!set.is_aligned_with(&series(4)));

        let shifted = s.slice(&crate::types::DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        ).unwrap());
        assert!(!set.is_aligned_with(&shifted));
    }
}
