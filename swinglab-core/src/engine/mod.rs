//! Bar-by-bar simulation engine.
//!
//! A single run is a strictly sequential fold over the execution-timeframe
//! bars: decrement cooldown, ratchet the trailing extreme, ask the signal
//! generator for a decision, execute it, record an equity point, check the
//! fatal balance condition. The engine owns the position and balance
//! exclusively; nothing else mutates them.
//!
//! Balance moves only when a trade closes. If it ever reaches zero or
//! below, the run halts at that bar and the result carries a `truncated`
//! flag together with everything accumulated so far.

pub mod sizing;

use crate::config::{ConfigError, StrategyConfig};
use crate::data::{self, DataError};
use crate::domain::{
    AuditEntry, AuditEvent, Bar, Direction, EquityPoint, ExitReason, OpenPosition, PositionState,
    Trade,
};
use crate::indicators::{atr, resolve_nans, rsi};
use crate::signal::{PositionSnapshot, Signal, SignalContext, SignalGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Anything that stops a simulation from starting.
#[derive(Debug, Error, PartialEq)]
pub enum BacktestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Complete output of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Closed trades, ordered by exit time.
    pub trades: Vec<Trade>,
    /// One point per processed bar.
    pub equity_curve: Vec<EquityPoint>,
    /// State-transition history, for debugging and replay.
    pub audit: Vec<AuditEntry>,
    /// True when the run halted early on a depleted balance.
    pub truncated: bool,
    pub final_balance: f64,
    pub bars_processed: usize,
}

/// Mutable per-run state. One instance per run, never shared.
struct SimState {
    balance: f64,
    position: PositionState,
    cooldown_remaining: usize,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    audit: Vec<AuditEntry>,
}

impl SimState {
    fn new(initial_balance: f64, capacity: usize) -> Self {
        Self {
            balance: initial_balance,
            position: PositionState::Flat,
            cooldown_remaining: 0,
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(capacity),
            audit: Vec::new(),
        }
    }
}

/// The simulation engine. Construction validates the config; `run` is then
/// a pure function of the input bars and may be called repeatedly (each
/// call starts from a fresh state).
#[derive(Debug, Clone)]
pub struct Backtester {
    config: StrategyConfig,
    generator: SignalGenerator,
}

impl Backtester {
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = SignalGenerator::new(&config);
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Run the simulation over an execution-timeframe series with a
    /// higher-timeframe trend series.
    pub fn run(&self, exec_bars: &[Bar], higher_bars: &[Bar]) -> Result<RunResult, DataError> {
        data::validate_pair(exec_bars, higher_bars)?;
        let cfg = &self.config;

        // Indicators are computed and NaN-resolved once, before the loop;
        // sizing arithmetic never sees a NaN.
        let closes: Vec<f64> = exec_bars.iter().map(|b| b.close).collect();
        let atr_series = resolve_nans(&atr(exec_bars, cfg.atr_period));
        let rsi_series = resolve_nans(&rsi(&closes, cfg.rsi_period));
        let higher_closes: Vec<f64> = higher_bars.iter().map(|b| b.close).collect();
        let spacing = data::higher_tf_spacing(higher_bars);

        let mut sim = SimState::new(cfg.initial_balance, exec_bars.len());
        let mut truncated = false;
        let mut bars_processed = 0;

        for (i, bar) in exec_bars.iter().enumerate() {
            bars_processed = i + 1;
            let price = bar.close;
            let bar_atr = atr_series[i];

            // Cooldown pauses all signal handling; bookkeeping continues.
            // The position is always flat here (cooldown starts at close).
            if sim.cooldown_remaining > 0 {
                sim.cooldown_remaining -= 1;
                self.record_equity(&mut sim, bar);
                continue;
            }

            // Ratchet the trailing extreme, then freeze the exit thresholds
            // the generator will consult for this bar.
            let snapshot = match &mut sim.position {
                PositionState::Open(pos) => {
                    pos.ratchet(price);
                    PositionSnapshot::Open {
                        direction: pos.direction,
                        stop_loss: pos.stop_loss,
                        trailing_target: pos.trailing_target(cfg.tp_multiplier * bar_atr),
                    }
                }
                PositionState::Flat => PositionSnapshot::Flat,
            };

            let visible = data::visible_len(higher_bars, spacing, bar.timestamp);
            let ctx = SignalContext {
                timestamp: bar.timestamp,
                close: price,
                volume: bar.volume,
                index: i,
                rsi: &rsi_series,
                higher_closes: &higher_closes[..visible],
                position: snapshot,
            };

            match (self.generator.evaluate(&ctx), snapshot) {
                (
                    Signal::CloseLong | Signal::CloseShort,
                    PositionSnapshot::Open {
                        direction,
                        stop_loss,
                        trailing_target,
                    },
                ) => {
                    let reason = self.exit_reason(bar, direction, stop_loss, trailing_target);
                    self.close_position(&mut sim, bar, reason);
                }
                (Signal::Buy, PositionSnapshot::Flat) => {
                    self.try_enter(&mut sim, bar, bar_atr, Direction::Long);
                }
                (Signal::Sell, PositionSnapshot::Flat) => {
                    self.try_enter(&mut sim, bar, bar_atr, Direction::Short);
                }
                _ => {}
            }

            self.record_equity(&mut sim, bar);

            if sim.balance <= 0.0 {
                warn!(bar = i, balance = sim.balance, "balance depleted, halting run");
                let equity = self.equity(&sim, price);
                sim.audit.push(AuditEntry {
                    timestamp: bar.timestamp,
                    event: AuditEvent::Halted,
                    price,
                    balance: sim.balance,
                    equity,
                    state: sim.position.side(),
                });
                truncated = true;
                break;
            }
        }

        Ok(RunResult {
            trades: sim.trades,
            equity_curve: sim.equity_curve,
            audit: sim.audit,
            truncated,
            final_balance: sim.balance,
            bars_processed,
        })
    }

    /// Classify why the generator asked for a close. The engine computed
    /// the thresholds, so it can name the binding one; the priority mirrors
    /// the generator's checks.
    fn exit_reason(
        &self,
        bar: &Bar,
        direction: Direction,
        stop_loss: f64,
        trailing_target: f64,
    ) -> ExitReason {
        if self.config.session.in_close_window(bar.timestamp) {
            return ExitReason::SessionClose;
        }
        let (hit_stop, hit_trailing) = match direction {
            Direction::Long => (bar.close <= stop_loss, bar.close <= trailing_target),
            Direction::Short => (bar.close >= stop_loss, bar.close >= trailing_target),
        };
        if hit_stop {
            ExitReason::StopLoss
        } else if hit_trailing {
            ExitReason::TrailingStop
        } else {
            ExitReason::TrendReversal
        }
    }

    fn try_enter(&self, sim: &mut SimState, bar: &Bar, bar_atr: f64, direction: Direction) {
        let cfg = &self.config;
        let stop_distance = cfg.sl_multiplier * bar_atr;
        let risk_budget = cfg.risk_fraction(sim.balance) * sim.balance;

        let Some(size) = sizing::position_size(
            cfg.platform,
            risk_budget,
            stop_distance,
            cfg.min_size,
            cfg.max_size,
        ) else {
            // Arithmetic guard: a zero stop distance (flat market) or zero
            // budget skips this entry; the run continues.
            warn!(
                time = %bar.timestamp,
                stop_distance,
                "entry skipped: degenerate stop distance or risk budget"
            );
            self.push_audit(sim, bar, AuditEvent::EntrySkipped);
            return;
        };

        let stop_loss = match direction {
            Direction::Long => bar.close - stop_distance,
            Direction::Short => bar.close + stop_distance,
        };
        sim.position = PositionState::Open(OpenPosition {
            direction,
            entry_time: bar.timestamp,
            entry_price: bar.close,
            size,
            stop_loss,
            trailing_extreme: bar.close,
        });
        debug!(
            time = %bar.timestamp,
            ?direction,
            price = bar.close,
            size,
            stop_loss,
            "entered position"
        );
        self.push_audit(sim, bar, AuditEvent::Entered);
    }

    fn close_position(&self, sim: &mut SimState, bar: &Bar, reason: ExitReason) {
        let cfg = &self.config;
        let PositionState::Open(pos) = std::mem::replace(&mut sim.position, PositionState::Flat)
        else {
            return;
        };
        let profit = sizing::realized_profit(
            cfg.platform,
            pos.direction,
            pos.entry_price,
            bar.close,
            pos.size,
            cfg.leverage,
            cfg.fee_rate,
        );
        sim.balance += profit;
        sim.cooldown_remaining = cfg.cooldown_bars;
        debug!(
            time = %bar.timestamp,
            direction = ?pos.direction,
            ?reason,
            profit,
            balance = sim.balance,
            "closed position"
        );
        sim.trades.push(Trade {
            direction: pos.direction,
            entry_time: pos.entry_time,
            entry_price: pos.entry_price,
            exit_time: bar.timestamp,
            exit_price: bar.close,
            size: pos.size,
            realized_profit: profit,
            exit_reason: reason,
        });
        self.push_audit(sim, bar, AuditEvent::Exited);
    }

    fn equity(&self, sim: &SimState, price: f64) -> f64 {
        match &sim.position {
            PositionState::Flat => sim.balance,
            PositionState::Open(pos) => {
                sim.balance
                    + sizing::unrealized_profit(
                        self.config.platform,
                        pos.direction,
                        pos.entry_price,
                        price,
                        pos.size,
                        self.config.leverage,
                    )
            }
        }
    }

    fn record_equity(&self, sim: &mut SimState, bar: &Bar) {
        let equity = self.equity(sim, bar.close);
        sim.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            balance: sim.balance,
            equity,
            state: sim.position.side(),
        });
    }

    fn push_audit(&self, sim: &mut SimState, bar: &Bar, event: AuditEvent) {
        let equity = self.equity(sim, bar.close);
        sim.audit.push(AuditEntry {
            timestamp: bar.timestamp,
            event,
            price: bar.close,
            balance: sim.balance,
            equity,
            state: sim.position.side(),
        });
    }
}
