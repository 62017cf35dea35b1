//! Indicator provider: pure functions over bar/close slices.
//!
//! Every function returns a series aligned 1:1 with its input, NaN-padded
//! during warmup. Callers that feed indicator output into sizing arithmetic
//! must resolve NaNs first (see [`fill::resolve_nans`]); the engine does
//! this once, before its bar loop.

pub mod atr;
pub mod ema;
pub mod fill;
pub mod rsi;

pub use atr::{atr, true_range, wilder_smooth};
pub use ema::ema;
pub use fill::resolve_nans;
pub use rsi::rsi;

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| crate::domain::Bar {
            timestamp: base + Duration::hours(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        })
        .collect()
}
