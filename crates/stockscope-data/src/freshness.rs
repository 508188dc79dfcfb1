//! Cache freshness rules.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use std::fmt;
use stockscope_core::types::DateRange;

use crate::store::CacheEntry;

/// Why a cached entry cannot be served as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Older than the refresh window.
    Expired,
    /// The request reaches further back than the entry was fetched for.
    ShallowHistory,
    /// The entry was fetched before this session closed and does not contain it.
    MissingSession(NaiveDate),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Expired => f.write_str("refresh window elapsed"),
            StaleReason::ShallowHistory => f.write_str("requested history exceeds cached range"),
            StaleReason::MissingSession(date) => write!(f, "missing session {}", date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Decides whether a cached entry may be served.
///
/// Sessions run Monday to Friday and close at `session_close` UTC. Exchange
/// holidays are not modelled: a holiday looks like a missing session, but an
/// entry fetched after that day's close is not refetched for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub refresh_window: Duration,
    pub session_close: NaiveTime,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            refresh_window: Duration::hours(24),
            session_close: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl FreshnessPolicy {
    pub fn new(refresh_window: Duration, session_close: NaiveTime) -> Self {
        Self {
            refresh_window,
            session_close,
        }
    }

    /// The most recent weekday whose close is at or before `now`.
    pub fn last_completed_session(&self, now: DateTime<Utc>) -> NaiveDate {
        let mut date = now.date_naive();
        if now.time() < self.session_close {
            date = date.pred_opt().unwrap_or(date);
        }
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.checked_sub_days(Days::new(1)).unwrap_or(date);
        }
        date
    }

    /// The instant a session on `date` closes.
    pub fn session_close_at(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.session_close).and_utc()
    }

    /// Classify `entry` for a request covering `request` at time `now`.
    pub fn assess(&self, entry: &CacheEntry, now: DateTime<Utc>, request: &DateRange) -> Freshness {
        if now - entry.fetched_at > self.refresh_window {
            return Freshness::Stale(StaleReason::Expired);
        }
        if request.start < entry.requested.start {
            return Freshness::Stale(StaleReason::ShallowHistory);
        }

        let session = self.last_completed_session(now);
        let covered = entry.series.last_date().is_some_and(|last| last >= session);
        if !covered && entry.fetched_at < self.session_close_at(session) {
            return Freshness::Stale(StaleReason::MissingSession(session));
        }

        Freshness::Fresh
    }
}
