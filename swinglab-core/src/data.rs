//! Input series validation and the higher-timeframe visibility cutoff.
//!
//! The engine consumes two pre-fetched bar series: the execution timeframe
//! and a higher timeframe used as a trend filter. Both are validated here
//! before the loop starts; a bad series is a [`DataError`], not a silently
//! wrong simulation.

use crate::domain::Bar;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Problems with the input bar series. Surfaced to the caller; the
/// simulation does not run.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("{series} bar series is empty")]
    Empty { series: &'static str },

    #[error("{series} timestamps not strictly ascending at index {index}")]
    NotAscending { series: &'static str, index: usize },

    #[error("{series} has a non-finite price at index {index}")]
    NonFinitePrice { series: &'static str, index: usize },

    #[error("higher-timeframe series starts at {higher_start} but execution series starts at {exec_start}")]
    InsufficientCoverage {
        higher_start: DateTime<Utc>,
        exec_start: DateTime<Utc>,
    },
}

/// Validate one series: non-empty, strictly ascending unique timestamps,
/// finite OHLC everywhere. Internal gaps are fine.
pub fn validate_series(series: &'static str, bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::Empty { series });
    }
    for (i, bar) in bars.iter().enumerate() {
        if bar.is_void()
            || !bar.open.is_finite()
            || !bar.high.is_finite()
            || !bar.low.is_finite()
            || !bar.close.is_finite()
        {
            return Err(DataError::NonFinitePrice { series, index: i });
        }
        if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
            return Err(DataError::NotAscending { series, index: i });
        }
    }
    Ok(())
}

/// Validate the pair: both series individually, and the higher timeframe
/// must cover the execution window from the start.
pub fn validate_pair(exec: &[Bar], higher: &[Bar]) -> Result<(), DataError> {
    validate_series("execution", exec)?;
    validate_series("higher-timeframe", higher)?;
    if higher[0].timestamp > exec[0].timestamp {
        return Err(DataError::InsufficientCoverage {
            higher_start: higher[0].timestamp,
            exec_start: exec[0].timestamp,
        });
    }
    Ok(())
}

/// Modal spacing between consecutive higher-timeframe bars, used as the
/// bar duration when deciding whether a bar has closed. A single-bar
/// series gets a zero spacing (that bar is visible from its own open).
pub fn higher_tf_spacing(bars: &[Bar]) -> Duration {
    if bars.len() < 2 {
        return Duration::zero();
    }
    let mut diffs: Vec<Duration> = bars
        .windows(2)
        .map(|w| w[1].timestamp - w[0].timestamp)
        .collect();
    diffs.sort();
    // Modal value of a sorted list: longest run of equal elements.
    let mut best = diffs[0];
    let mut best_len = 0usize;
    let mut run_start = 0usize;
    for i in 1..=diffs.len() {
        if i == diffs.len() || diffs[i] != diffs[run_start] {
            if i - run_start > best_len {
                best_len = i - run_start;
                best = diffs[run_start];
            }
            run_start = i;
        }
    }
    best
}

/// Number of higher-timeframe bars fully closed at `now`.
///
/// A bar is visible once its close time (`timestamp + spacing`) is at or
/// before the current execution timestamp. Consulting anything beyond this
/// prefix would be lookahead, which is a correctness bug in the trend
/// filter, not a style choice.
pub fn visible_len(higher: &[Bar], spacing: Duration, now: DateTime<Utc>) -> usize {
    higher.partition_point(|b| b.timestamp + spacing <= now)
}
