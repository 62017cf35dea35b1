//! Performance metrics: pure functions over the trade ledger and the
//! equity curve. No dependency on the engine's internals; feeding the
//! same ledger back in always reproduces the same numbers.

use serde::{Deserialize, Serialize};
use swinglab_core::domain::{EquityPoint, Trade};

/// Aggregate performance of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_profit: f64,
    pub num_trades: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// +∞ when there are profits but no losses; 0.0 for an empty ledger.
    pub profit_factor: f64,
    /// Negative fraction of the running equity peak (-0.15 = 15% decline).
    pub max_drawdown: f64,
    pub sharpe: f64,
}

impl PerformanceSummary {
    /// Compute all metrics. `periods_per_year` is the Sharpe annualization
    /// factor: bars per year of the equity curve's timeframe (e.g. 8760
    /// for hourly crypto, 252 for daily equities).
    pub fn compute(trades: &[Trade], equity_curve: &[EquityPoint], periods_per_year: f64) -> Self {
        let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        Self {
            total_profit: total_profit(trades),
            num_trades: trades.len(),
            win_rate: win_rate(trades),
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            profit_factor: profit_factor(trades),
            max_drawdown: max_drawdown(&equity),
            sharpe: sharpe_ratio(&equity, periods_per_year),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Sum of realized profits over closed trades.
pub fn total_profit(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.realized_profit).sum()
}

/// Fraction of trades with positive profit; 0.0 for an empty ledger.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.realized_profit > 0.0)
        .map(|t| t.realized_profit)
        .sum()
}

pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.realized_profit < 0.0)
        .map(|t| t.realized_profit.abs())
        .sum()
}

/// Gross profit over gross loss. +∞ when every trade won and at least one
/// did; 0.0 when there are no trades (or no winners and no losers).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gp = gross_profit(trades);
    let gl = gross_loss(trades);
    if gl > 0.0 {
        gp / gl
    } else if gp > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Maximum drawdown as a negative fraction of the running peak.
///
/// Returns 0.0 for constant or monotonically rising equity.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let mut peak = equity[0];
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized Sharpe ratio over the equity curve's period returns.
///
/// Sharpe = mean(returns) / std(returns) × sqrt(periods_per_year).
/// Returns 0.0 when the deviation is zero or there are fewer than 3 points.
pub fn sharpe_ratio(equity: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    let std = var.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Percentage change between consecutive equity points. Points at or below
/// zero equity yield no return (the run has halted there anyway).
pub fn period_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use swinglab_core::domain::{Direction, ExitReason, PositionSide};

    fn trade(profit: f64) -> Trade {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Trade {
            direction: Direction::Long,
            entry_time: t0,
            entry_price: 100.0,
            exit_time: t0 + Duration::hours(4),
            exit_price: 100.0 + profit,
            size: 1.0,
            realized_profit: profit,
            exit_reason: ExitReason::TrailingStop,
        }
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                timestamp: t0 + Duration::hours(i as i64),
                balance: equity,
                equity,
                state: PositionSide::Flat,
            })
            .collect()
    }

    #[test]
    fn empty_ledger_metrics() {
        let summary = PerformanceSummary::compute(&[], &curve(&[100.0, 100.0]), 8760.0);
        assert_eq!(summary.total_profit, 0.0);
        assert_eq!(summary.num_trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.profit_factor, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.sharpe, 0.0);
    }

    #[test]
    fn win_rate_and_totals() {
        let trades = [trade(10.0), trade(-5.0), trade(20.0), trade(-5.0)];
        assert_eq!(total_profit(&trades), 20.0);
        assert_eq!(win_rate(&trades), 0.5);
        assert_eq!(gross_profit(&trades), 30.0);
        assert_eq!(gross_loss(&trades), 10.0);
        assert_eq!(profit_factor(&trades), 3.0);
    }

    #[test]
    fn profit_factor_infinite_without_losses() {
        let trades = [trade(10.0), trade(5.0)];
        assert!(profit_factor(&trades).is_infinite());
        assert!(profit_factor(&trades) > 0.0);
    }

    #[test]
    fn profit_factor_zero_for_all_losers() {
        let trades = [trade(-10.0), trade(-5.0)];
        assert_eq!(profit_factor(&trades), 0.0);
    }

    #[test]
    fn drawdown_is_negative_fraction_of_peak() {
        // Peak 120, trough 90: drawdown = (90-120)/120 = -0.25.
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 110.0]);
        assert!((dd + 0.25).abs() < 1e-12);
    }

    #[test]
    fn drawdown_zero_for_rising_equity() {
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
    }

    #[test]
    fn sharpe_zero_for_constant_equity() {
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0, 100.0], 8760.0), 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        // Alternating small/large gains: positive mean, nonzero std.
        let sharpe = sharpe_ratio(&[100.0, 101.0, 103.0, 104.0, 106.0], 252.0);
        assert!(sharpe > 0.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let trades = [trade(10.0), trade(-5.0)];
        let equity = curve(&[100.0, 110.0, 105.0]);
        let a = PerformanceSummary::compute(&trades, &equity, 8760.0);
        let b = PerformanceSummary::compute(&trades, &equity, 8760.0);
        assert_eq!(a.total_profit, b.total_profit);
        assert_eq!(a.win_rate, b.win_rate);
        assert_eq!(a.profit_factor, b.profit_factor);
        assert_eq!(a.sharpe, b.sharpe);
    }
}
