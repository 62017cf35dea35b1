//! Signal generation: one of {Buy, Sell, Hold, CloseLong, CloseShort} per bar.
//!
//! Priority order is fixed: calendar rule, then exit checks for an open
//! position, then entry checks while flat. A Buy while already long (or
//! Sell while short) can never be emitted; entry rules are only consulted
//! while flat, which suppresses duplicates structurally.
//!
//! The generator decides *whether* to exit; the numeric stop and trailing
//! levels it consults are computed by the engine and handed in through the
//! context, so the two components never disagree about thresholds.

use crate::calendar::SessionRules;
use crate::config::StrategyConfig;
use crate::domain::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-bar decision of the signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    CloseLong,
    CloseShort,
}

/// Higher-timeframe trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

/// Classify the trend from the last `lookback` higher-timeframe closes:
/// mean of consecutive differences, compared against ±epsilon.
/// Unknown when the window is short or NaN-laden.
pub fn classify_trend(closes: &[f64], lookback: usize, epsilon: f64) -> TrendDirection {
    debug_assert!(lookback >= 2);
    if closes.len() < lookback {
        return TrendDirection::Unknown;
    }
    let window = &closes[closes.len() - lookback..];
    if window.iter().any(|v| v.is_nan()) {
        return TrendDirection::Unknown;
    }
    let mean_diff =
        window.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (lookback - 1) as f64;
    if mean_diff > epsilon {
        TrendDirection::Bullish
    } else if mean_diff < -epsilon {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    }
}

/// What the generator may know about the engine's position, thresholds
/// included. Carries no sizing or balance information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionSnapshot {
    Flat,
    Open {
        direction: Direction,
        stop_loss: f64,
        trailing_target: f64,
    },
}

/// Everything the generator sees for one bar. `rsi` is the full
/// execution-series RSI (NaN-resolved); `higher_closes` is the visible
/// prefix only; the engine truncates it at the no-lookahead cutoff.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
    pub index: usize,
    pub rsi: &'a [f64],
    pub higher_closes: &'a [f64],
    pub position: PositionSnapshot,
}

/// Stateless per-run signal generator, built from the validated config.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    oversold: f64,
    overbought: f64,
    confirmation_bars: usize,
    trend_lookback: usize,
    trend_epsilon: f64,
    volume_filter: Option<f64>,
    session: SessionRules,
}

impl SignalGenerator {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            oversold: config.rsi_oversold,
            overbought: config.rsi_overbought,
            confirmation_bars: config.confirmation_bars,
            trend_lookback: config.trend_lookback,
            trend_epsilon: config.trend_epsilon,
            volume_filter: config.volume_filter,
            session: config.session,
        }
    }

    pub fn evaluate(&self, ctx: &SignalContext) -> Signal {
        // 1. Calendar rule: week-close window flattens unconditionally.
        if self.session.in_close_window(ctx.timestamp) {
            return match ctx.position {
                PositionSnapshot::Open {
                    direction: Direction::Long,
                    ..
                } => Signal::CloseLong,
                PositionSnapshot::Open {
                    direction: Direction::Short,
                    ..
                } => Signal::CloseShort,
                PositionSnapshot::Flat => Signal::Hold,
            };
        }

        // 2. Exit checks for an open position.
        if let PositionSnapshot::Open {
            direction,
            stop_loss,
            trailing_target,
        } = ctx.position
        {
            let breached = match direction {
                Direction::Long => ctx.close <= stop_loss || ctx.close <= trailing_target,
                Direction::Short => ctx.close >= stop_loss || ctx.close >= trailing_target,
            };
            let trend = self.trend(ctx);
            let reversed = matches!(
                (direction, trend),
                (Direction::Long, TrendDirection::Bearish)
                    | (Direction::Short, TrendDirection::Bullish)
            );
            if breached || reversed {
                return match direction {
                    Direction::Long => Signal::CloseLong,
                    Direction::Short => Signal::CloseShort,
                };
            }
            return Signal::Hold;
        }

        // 3. Entry checks, flat only.
        if self.session.in_reopen_block(ctx.timestamp) {
            return Signal::Hold;
        }
        if let Some(threshold) = self.volume_filter {
            if ctx.volume < threshold {
                return Signal::Hold;
            }
        }
        match self.trend(ctx) {
            TrendDirection::Bullish if self.rsi_crossed_up(ctx) => Signal::Buy,
            TrendDirection::Bearish if self.rsi_crossed_down(ctx) => Signal::Sell,
            // Neutral or Unknown trend blocks entries entirely.
            _ => Signal::Hold,
        }
    }

    fn trend(&self, ctx: &SignalContext) -> TrendDirection {
        classify_trend(ctx.higher_closes, self.trend_lookback, self.trend_epsilon)
    }

    /// Upward cross through the oversold threshold: the previous
    /// `confirmation_bars` values all held at or below it, the current
    /// value is above it.
    fn rsi_crossed_up(&self, ctx: &SignalContext) -> bool {
        let i = ctx.index;
        if i < self.confirmation_bars {
            return false;
        }
        let held = ctx.rsi[i - self.confirmation_bars..i]
            .iter()
            .all(|&v| v <= self.oversold);
        held && ctx.rsi[i] > self.oversold
    }

    /// Symmetric downward cross through the overbought threshold.
    fn rsi_crossed_down(&self, ctx: &SignalContext) -> bool {
        let i = ctx.index;
        if i < self.confirmation_bars {
            return false;
        }
        let held = ctx.rsi[i - self.confirmation_bars..i]
            .iter()
            .all(|&v| v >= self.overbought);
        held && ctx.rsi[i] < self.overbought
    }
}
