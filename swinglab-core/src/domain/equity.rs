//! Equity curve points and the per-transition audit trail.

use super::position::PositionSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point per processed bar.
///
/// `balance` is realized only; `equity` adds the unrealized P&L of the open
/// position, so `equity == balance` whenever the state is flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub balance: f64,
    pub equity: f64,
    pub state: PositionSide,
}

/// What happened at a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    Entered,
    Exited,
    /// Entry signal dropped by the arithmetic guard (zero stop distance).
    EntrySkipped,
    /// Balance depleted; the simulation stopped at this bar.
    Halted,
}

/// Audit record emitted at every state transition, sufficient to replay the
/// position machine's history for debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub price: f64,
    pub balance: f64,
    pub equity: f64,
    pub state: PositionSide,
}
