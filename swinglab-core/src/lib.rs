//! SwingLab Core: bar-by-bar backtest simulation engine.
//!
//! The crate contains:
//! - Domain types (bars, positions, trades, equity points, audit entries)
//! - Indicator provider (RSI, ATR, EMA) with pre-loop NaN resolution
//! - Signal generator (RSI threshold crosses gated by a higher-timeframe
//!   trend filter, session calendar, volume filter)
//! - Position/risk engine (ATR-scaled stops, ratcheting trailing targets,
//!   risk-fraction sizing under two platform conventions, cooldown,
//!   depleted-balance halt)
//!
//! Performance analytics over the resulting ledger live in
//! `swinglab-runner`, which also hosts the parallel batch driver.

pub mod calendar;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;

pub use config::{ConfigError, Platform, StrategyConfig};
pub use data::DataError;
pub use engine::{Backtester, BacktestError, RunResult};
