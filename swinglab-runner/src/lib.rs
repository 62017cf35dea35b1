//! SwingLab Runner: performance analytics over simulation output, plus a
//! rayon-based batch driver for parameter sweeps. Every run in a batch
//! gets a freshly constructed engine and shares nothing mutable.

pub mod batch;
pub mod metrics;

pub use batch::{best_by_profit, run_batch, BatchRun};
pub use metrics::PerformanceSummary;
