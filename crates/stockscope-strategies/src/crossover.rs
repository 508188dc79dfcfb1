//! Crossover detection shared by the line-crossing strategies.

use stockscope_core::types::{PriceSeries, Signal};

/// Direction of a crossing between two lines from one point to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    /// `a` was below `b` and is now at or above it.
    Above,
    /// `a` was above `b` and is now at or below it.
    Below,
    None,
}

/// Classify the move of line `a` relative to line `b` between two points.
///
/// Touching without having been strictly on the other side is not a cross,
/// so a line resting on the other does not fire twice.
pub fn detect_cross(prev_a: f64, prev_b: f64, cur_a: f64, cur_b: f64) -> Cross {
    if prev_a < prev_b && cur_a >= cur_b {
        Cross::Above
    } else if prev_a > prev_b && cur_a <= cur_b {
        Cross::Below
    } else {
        Cross::None
    }
}

/// Map a relative gap to a strength score in tiers.
pub fn strength_tier(magnitude: f64, strong: f64, moderate: f64) -> f64 {
    if magnitude > strong {
        0.9
    } else if magnitude > moderate {
        0.6
    } else {
        0.3
    }
}

/// Build one signal per point from two aligned lines.
///
/// Points where either line is undefined at `i` or `i - 1` are HOLD. The
/// `strength` callback receives the index and the current values of both
/// lines.
pub fn crossover_signals<F>(
    series: &PriceSeries,
    strategy: &str,
    a: &[Option<f64>],
    b: &[Option<f64>],
    strength: F,
) -> Vec<Signal>
where
    F: Fn(usize, f64, f64) -> f64,
{
    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let lines = (i > 0)
                .then(|| Some((a[i - 1]?, b[i - 1]?, a[i]?, b[i]?)))
                .flatten();

            match lines {
                Some((pa, pb, ca, cb)) => match detect_cross(pa, pb, ca, cb) {
                    Cross::Above => Signal::buy(point.date, strategy, strength(i, ca, cb)),
                    Cross::Below => Signal::sell(point.date, strategy, strength(i, ca, cb)),
                    Cross::None => Signal::hold(point.date, strategy),
                },
                None => Signal::hold(point.date, strategy),
            }
        })
        .collect()
}

/// Relative gap between two values, zero when `b` is zero.
pub fn relative_gap(a: f64, b: f64) -> f64 {
    if b != 0.0 {
        ((a - b) / b).abs()
    } else {
        0.0
    }
}
