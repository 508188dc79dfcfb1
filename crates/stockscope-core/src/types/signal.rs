//! Trading signals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete recommendation emitted by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// A strategy's recommendation for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Trading day the signal applies to
    pub date: NaiveDate,
    /// Name of the strategy that produced it
    pub strategy: String,
    /// Recommended action
    pub action: SignalAction,
    /// Score in [0, 1] for BUY/SELL; absent for HOLD
    pub strength: Option<f64>,
}

impl Signal {
    pub fn hold(date: NaiveDate, strategy: &str) -> Self {
        Self {
            date,
            strategy: strategy.to_string(),
            action: SignalAction::Hold,
            strength: None,
        }
    }

    pub fn buy(date: NaiveDate, strategy: &str, strength: f64) -> Self {
        Self {
            date,
            strategy: strategy.to_string(),
            action: SignalAction::Buy,
            strength: Some(strength.clamp(0.0, 1.0)),
        }
    }

    pub fn sell(date: NaiveDate, strategy: &str, strength: f64) -> Self {
        Self {
            date,
            strategy: strategy.to_string(),
            action: SignalAction::Sell,
            strength: Some(strength.clamp(0.0, 1.0)),
        }
    }

    /// True for BUY and SELL.
    pub fn is_actionable(&self) -> bool {
        self.action != SignalAction::Hold
    }
}
