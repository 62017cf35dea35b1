//! Parallel batch driver for parameter sweeps.
//!
//! Simulations are embarrassingly parallel: each run gets a freshly
//! constructed engine and reads the shared bar slices immutably. A run's
//! output is committed to the result vector only after the run finishes,
//! so cancelling or crashing one run never corrupts another's result.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use swinglab_core::domain::Bar;
use swinglab_core::{Backtester, BacktestError, RunResult, StrategyConfig};
use tracing::info;

use crate::metrics::PerformanceSummary;

/// One completed sweep entry: the config that produced it, the raw run
/// output, and the computed summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRun {
    pub config: StrategyConfig,
    pub result: RunResult,
    pub summary: PerformanceSummary,
}

/// Run every config against the same input series, in parallel.
///
/// Config or data failures surface per-entry; one bad parameter set does
/// not abort the rest of the sweep.
pub fn run_batch(
    configs: &[StrategyConfig],
    exec_bars: &[Bar],
    higher_bars: &[Bar],
    periods_per_year: f64,
) -> Vec<Result<BatchRun, BacktestError>> {
    info!(runs = configs.len(), bars = exec_bars.len(), "starting sweep");
    configs
        .par_iter()
        .map(|config| {
            let engine = Backtester::new(config.clone())?;
            let result = engine.run(exec_bars, higher_bars)?;
            let summary =
                PerformanceSummary::compute(&result.trades, &result.equity_curve, periods_per_year);
            Ok(BatchRun {
                config: config.clone(),
                result,
                summary,
            })
        })
        .collect()
}

/// Pick the successful run with the highest total profit.
pub fn best_by_profit(runs: &[Result<BatchRun, BacktestError>]) -> Option<&BatchRun> {
    runs.iter()
        .filter_map(|r| r.as_ref().ok())
        .max_by(|a, b| {
            a.summary
                .total_profit
                .partial_cmp(&b.summary.total_profit)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
