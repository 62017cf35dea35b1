//! Domain types: bars, positions, trades, equity points, audit entries.

pub mod bar;
pub mod equity;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use equity::{AuditEntry, AuditEvent, EquityPoint};
pub use position::{Direction, OpenPosition, PositionSide, PositionState};
pub use trade::{ExitReason, Trade};
