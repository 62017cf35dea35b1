//! Trade: a completed round trip, created at close and immutable thereafter.

use super::position::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Price crossed the ratcheted trailing target.
    TrailingStop,
    /// Price crossed the fixed protective stop set at entry.
    StopLoss,
    /// Higher-timeframe trend flipped against the held direction.
    TrendReversal,
    /// Forced flat by the session close window (end of trading week).
    SessionClose,
}

/// One closed trade. Appended to the ordered ledger at close; balance is
/// mutated at this point and nowhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub direction: Direction,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub size: f64,
    /// Net of the (optional) transaction fee, in account currency.
    pub realized_profit: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.realized_profit > 0.0
    }
}
