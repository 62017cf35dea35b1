//! Position lifecycle: FLAT ⇄ LONG/SHORT with a ratcheting trailing extreme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short. Multiplies price differences into P&L.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// Flat/long/short snapshot for reporting (equity curve, audit trail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

/// An open position. Exists only between entry and exit; the enum shape of
/// [`PositionState`] guarantees that size, stop and trailing fields are
/// undefined while flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub direction: Direction,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    /// Always > 0. Units depend on the platform convention (base-asset
    /// units for crypto, standard lots for FX).
    pub size: f64,
    /// Fixed protective stop, set once at entry.
    pub stop_loss: f64,
    /// Highest close since entry for longs, lowest for shorts.
    /// Ratchets monotonically; never moves against the position.
    pub trailing_extreme: f64,
}

impl OpenPosition {
    /// Ratchet the trailing extreme with the current price.
    ///
    /// Long: extreme can only rise. Short: extreme can only fall. An ATR
    /// expansion therefore never loosens the trailing target derived from it
    /// relative to the extreme itself.
    pub fn ratchet(&mut self, price: f64) {
        self.trailing_extreme = match self.direction {
            Direction::Long => self.trailing_extreme.max(price),
            Direction::Short => self.trailing_extreme.min(price),
        };
    }

    /// Trailing exit level: the extreme backed off by `tp_distance` price units.
    pub fn trailing_target(&self, tp_distance: f64) -> f64 {
        match self.direction {
            Direction::Long => self.trailing_extreme - tp_distance,
            Direction::Short => self.trailing_extreme + tp_distance,
        }
    }

    /// Unrealized price move in the position's favor (can be negative).
    pub fn favorable_move(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price)
    }
}

/// Position state machine. Exactly one instance per simulated symbol,
/// owned exclusively by the engine for that run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    Open(OpenPosition),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn side(&self) -> PositionSide {
        match self {
            PositionState::Flat => PositionSide::Flat,
            PositionState::Open(p) => match p.direction {
                Direction::Long => PositionSide::Long,
                Direction::Short => PositionSide::Short,
            },
        }
    }

    pub fn as_open(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open_long(entry: f64) -> OpenPosition {
        OpenPosition {
            direction: Direction::Long,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            entry_price: entry,
            size: 1.0,
            stop_loss: entry - 5.0,
            trailing_extreme: entry,
        }
    }

    #[test]
    fn long_extreme_only_rises() {
        let mut pos = open_long(100.0);
        pos.ratchet(105.0);
        assert_eq!(pos.trailing_extreme, 105.0);
        pos.ratchet(101.0); // pullback does not lower the extreme
        assert_eq!(pos.trailing_extreme, 105.0);
    }

    #[test]
    fn short_extreme_only_falls() {
        let mut pos = open_long(100.0);
        pos.direction = Direction::Short;
        pos.ratchet(95.0);
        assert_eq!(pos.trailing_extreme, 95.0);
        pos.ratchet(99.0);
        assert_eq!(pos.trailing_extreme, 95.0);
    }

    #[test]
    fn trailing_target_backs_off_extreme() {
        let mut pos = open_long(100.0);
        pos.ratchet(110.0);
        assert_eq!(pos.trailing_target(3.0), 107.0);
        pos.direction = Direction::Short;
        pos.trailing_extreme = 90.0;
        assert_eq!(pos.trailing_target(3.0), 93.0);
    }

    #[test]
    fn flat_state_has_no_open_fields() {
        let state = PositionState::Flat;
        assert!(state.is_flat());
        assert!(state.as_open().is_none());
        assert_eq!(state.side(), PositionSide::Flat);
    }

    #[test]
    fn favorable_move_signs() {
        let mut pos = open_long(100.0);
        assert_eq!(pos.favorable_move(104.0), 4.0);
        pos.direction = Direction::Short;
        assert_eq!(pos.favorable_move(104.0), -4.0);
    }
}
