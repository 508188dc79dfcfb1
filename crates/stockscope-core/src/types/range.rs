//! Calendar date ranges.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DataError;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DataError> {
        if start > end {
            return Err(DataError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending at (and including) `end`.
    pub fn trailing_days(end: NaiveDate, days: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Check if a date is inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of calendar days in the range.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
