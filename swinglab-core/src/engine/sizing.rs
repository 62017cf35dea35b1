//! Risk-based position sizing and platform pip/lot conventions.
//!
//! Two conventions exist and only two:
//! - Binance (percentage-of-price / crypto): size is in base-asset units,
//!   and one price unit of movement is worth one account unit per unit of
//!   size. `size = risk_budget / stop_distance`.
//! - MetaTrader (fixed-pip FX): size is in standard lots of 100 000 units;
//!   a pip is 0.0001, so one pip is worth 10 account units per lot.
//!   `size = risk_budget / (stop_pips × pip_value_per_lot)`, which is the
//!   same as dividing by `stop_distance × contract_size`.
//!
//! Any other platform is unrepresentable: `Platform` is a closed enum and
//! unknown names fail at config deserialization.

use crate::config::Platform;
use crate::domain::Direction;

/// FX pip size in price units.
pub const FX_PIP_SIZE: f64 = 1e-4;
/// Units per standard lot.
pub const FX_CONTRACT_SIZE: f64 = 100_000.0;
/// Account units per pip per standard lot (USD-quoted pairs).
pub const FX_PIP_VALUE_PER_LOT: f64 = FX_PIP_SIZE * FX_CONTRACT_SIZE;

impl Platform {
    /// Account units gained per one price unit of favorable movement, per
    /// unit of size.
    pub fn point_value(&self) -> f64 {
        match self {
            Platform::Binance => 1.0,
            Platform::Metatrader => FX_CONTRACT_SIZE,
        }
    }
}

/// Size a new position from the risk budget and the stop distance.
///
/// Returns `None` when the stop distance or the resulting size is not a
/// positive finite number (the arithmetic guard). The caller skips the
/// entry instead of dividing by zero; it never fabricates a size.
pub fn position_size(
    platform: Platform,
    risk_budget: f64,
    stop_distance: f64,
    min_size: f64,
    max_size: f64,
) -> Option<f64> {
    if !(stop_distance > 0.0) || !stop_distance.is_finite() || !(risk_budget > 0.0) {
        return None;
    }
    let size = risk_budget / (stop_distance * platform.point_value());
    if !size.is_finite() || size <= 0.0 {
        return None;
    }
    Some(size.clamp(min_size, max_size))
}

/// Realized profit of a round trip, net of the flat transaction fee.
///
/// The fee is charged once, on the exit notional; this is the only place
/// a cost is modeled and the only point where balance moves.
pub fn realized_profit(
    platform: Platform,
    direction: Direction,
    entry_price: f64,
    exit_price: f64,
    size: f64,
    leverage: f64,
    fee_rate: f64,
) -> f64 {
    let gross =
        direction.sign() * (exit_price - entry_price) * size * platform.point_value() * leverage;
    let fee = fee_rate * exit_price * size * platform.point_value();
    gross - fee
}

/// Mark-to-market P&L of an open position, same conversion, no fee.
pub fn unrealized_profit(
    platform: Platform,
    direction: Direction,
    entry_price: f64,
    current_price: f64,
    size: f64,
    leverage: f64,
) -> f64 {
    direction.sign() * (current_price - entry_price) * size * platform.point_value() * leverage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_size_is_risk_over_stop_distance() {
        // 1% of 100k = 1000 at risk, stop 50 price units away → 20 units.
        let size = position_size(Platform::Binance, 1_000.0, 50.0, 0.0, f64::INFINITY);
        assert_eq!(size, Some(20.0));
    }

    #[test]
    fn fx_size_is_in_lots() {
        // 1000 at risk, 20-pip stop (0.0020): 1000 / (0.002 * 100_000) = 5 lots,
        // equivalently 1000 / (20 pips * 10 per lot).
        let size = position_size(Platform::Metatrader, 1_000.0, 0.002, 0.01, 100.0);
        assert!((size.unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn fx_size_clamps_to_broker_bounds() {
        // Tiny risk budget → raw size below the 0.01-lot minimum.
        let size = position_size(Platform::Metatrader, 1.0, 0.01, 0.01, 100.0);
        assert_eq!(size, Some(0.01));
        // Huge budget clamps at the maximum.
        let size = position_size(Platform::Metatrader, 1e9, 0.0001, 0.01, 100.0);
        assert_eq!(size, Some(100.0));
    }

    #[test]
    fn zero_stop_distance_aborts_sizing() {
        assert_eq!(
            position_size(Platform::Binance, 1_000.0, 0.0, 0.0, f64::INFINITY),
            None
        );
        assert_eq!(
            position_size(Platform::Binance, 1_000.0, f64::NAN, 0.0, f64::INFINITY),
            None
        );
    }

    #[test]
    fn long_profit_sign() {
        let p = realized_profit(Platform::Binance, Direction::Long, 100.0, 110.0, 2.0, 1.0, 0.0);
        assert_eq!(p, 20.0);
        let p = realized_profit(Platform::Binance, Direction::Short, 100.0, 110.0, 2.0, 1.0, 0.0);
        assert_eq!(p, -20.0);
    }

    #[test]
    fn leverage_scales_profit() {
        let p = realized_profit(Platform::Binance, Direction::Long, 100.0, 101.0, 1.0, 10.0, 0.0);
        assert!((p - 10.0).abs() < 1e-12);
    }

    #[test]
    fn fee_deducted_once_at_exit() {
        let gross = realized_profit(Platform::Binance, Direction::Long, 100.0, 110.0, 2.0, 1.0, 0.0);
        let net = realized_profit(Platform::Binance, Direction::Long, 100.0, 110.0, 2.0, 1.0, 0.001);
        // Fee = 0.001 * 110 * 2 = 0.22 on the exit notional.
        assert!((gross - net - 0.22).abs() < 1e-12);
    }

    #[test]
    fn fx_profit_uses_contract_size() {
        // 20 pips on 5 lots: 0.002 * 5 * 100_000 = 1000.
        let p = realized_profit(
            Platform::Metatrader,
            Direction::Long,
            1.1000,
            1.1020,
            5.0,
            1.0,
            0.0,
        );
        assert!((p - 1_000.0).abs() < 1e-6);
    }
}
