//! Typed strategy/risk configuration.
//!
//! One structure, defaults enumerated once in `Default`, validated before a
//! simulation may run. There is no dict-style access and no process-wide
//! config singleton; the engine takes this by value at construction.

use crate::calendar::SessionRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform pip/lot convention.
///
/// Exactly two conventions are supported; anything else fails at
/// deserialization time, which is the ConfigError path for unknown
/// platforms; there is no silent approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Crypto-style percentage-of-price quoting. Sizes are base-asset
    /// units; one price unit of movement is worth one account unit per
    /// unit of size.
    Binance,
    /// FX-style fixed-pip quoting (pip = 0.0001). Sizes are standard lots
    /// of 100 000 units.
    Metatrader,
}

/// Everything a single simulation run needs, besides the bar data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    // ── Signal generation ──
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Bars the RSI must have held beyond the threshold before the cross
    /// that triggers an entry. 1 = plain threshold cross.
    pub confirmation_bars: usize,
    /// Higher-timeframe closes considered by the trend classifier.
    pub trend_lookback: usize,
    /// Mean consecutive-difference magnitude below which the trend is
    /// Neutral rather than Bullish/Bearish.
    pub trend_epsilon: f64,
    /// Entries require bar volume >= this threshold when set.
    pub volume_filter: Option<f64>,
    /// Week-close / reopen-block windows. Default is a 24/7 market.
    pub session: SessionRules,

    // ── Risk management ──
    /// Static risk fraction per trade (0.01 = 1% of balance).
    pub risk_pct: f64,
    /// Balance-proportional term: effective fraction grows by this much
    /// per multiple of the initial balance ("dynamic risk").
    pub risk_pct_dynamic: f64,
    /// Hard cap on the effective risk fraction.
    pub risk_pct_cap: f64,
    pub atr_period: usize,
    /// Stop distance = sl_multiplier × ATR.
    pub sl_multiplier: f64,
    /// Trailing-target distance = tp_multiplier × ATR.
    pub tp_multiplier: f64,
    /// Bars after a close during which no new entry may occur.
    pub cooldown_bars: usize,
    pub leverage: f64,
    /// Flat fee as a fraction of exit notional, deducted once, at close.
    pub fee_rate: f64,
    pub min_size: f64,
    pub max_size: f64,

    // ── Account ──
    pub initial_balance: f64,
    pub platform: Platform,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            rsi_period: 10,
            rsi_oversold: 35.0,
            rsi_overbought: 65.0,
            confirmation_bars: 1,
            trend_lookback: 5,
            trend_epsilon: 1e-6,
            volume_filter: None,
            session: SessionRules::default(),
            risk_pct: 0.01,
            risk_pct_dynamic: 0.0,
            risk_pct_cap: 0.05,
            atr_period: 14,
            sl_multiplier: 1.5,
            tp_multiplier: 3.0,
            cooldown_bars: 2,
            leverage: 1.0,
            fee_rate: 0.0,
            min_size: 0.0,
            max_size: f64::INFINITY,
            initial_balance: 100_000.0,
            platform: Platform::Binance,
        }
    }
}

/// Configuration rejected before the simulation starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{param} must be positive, got {value}")]
    NonPositive { param: &'static str, value: f64 },

    #[error("{param} must be at least {min}, got {value}")]
    TooSmall {
        param: &'static str,
        min: usize,
        value: usize,
    },

    #[error("rsi_oversold ({oversold}) must be below rsi_overbought ({overbought})")]
    ThresholdOrder { oversold: f64, overbought: f64 },

    #[error("RSI thresholds must lie in (0, 100): oversold {oversold}, overbought {overbought}")]
    ThresholdRange { oversold: f64, overbought: f64 },

    #[error("risk_pct {0} must lie in (0, 1]")]
    RiskFraction(f64),

    #[error("risk_pct_cap ({cap}) must be >= risk_pct ({risk_pct})")]
    RiskCapBelowBase { cap: f64, risk_pct: f64 },

    #[error("min_size ({min}) must not exceed max_size ({max})")]
    SizeBounds { min: f64, max: f64 },

    #[error("{param} must not be negative, got {value}")]
    Negative { param: &'static str, value: f64 },
}

impl StrategyConfig {
    /// Fail-fast validation. Called by the engine constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsi_period < 2 {
            return Err(ConfigError::TooSmall {
                param: "rsi_period",
                min: 2,
                value: self.rsi_period,
            });
        }
        if self.atr_period < 1 {
            return Err(ConfigError::TooSmall {
                param: "atr_period",
                min: 1,
                value: self.atr_period,
            });
        }
        if self.confirmation_bars < 1 {
            return Err(ConfigError::TooSmall {
                param: "confirmation_bars",
                min: 1,
                value: self.confirmation_bars,
            });
        }
        if self.trend_lookback < 2 {
            return Err(ConfigError::TooSmall {
                param: "trend_lookback",
                min: 2,
                value: self.trend_lookback,
            });
        }
        if !(self.rsi_oversold > 0.0 && self.rsi_overbought < 100.0) {
            return Err(ConfigError::ThresholdRange {
                oversold: self.rsi_oversold,
                overbought: self.rsi_overbought,
            });
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(ConfigError::ThresholdOrder {
                oversold: self.rsi_oversold,
                overbought: self.rsi_overbought,
            });
        }
        if !(self.risk_pct > 0.0 && self.risk_pct <= 1.0) {
            return Err(ConfigError::RiskFraction(self.risk_pct));
        }
        if self.risk_pct_cap < self.risk_pct {
            return Err(ConfigError::RiskCapBelowBase {
                cap: self.risk_pct_cap,
                risk_pct: self.risk_pct,
            });
        }
        for (param, value) in [
            ("sl_multiplier", self.sl_multiplier),
            ("tp_multiplier", self.tp_multiplier),
            ("leverage", self.leverage),
            ("initial_balance", self.initial_balance),
            ("trend_epsilon", self.trend_epsilon),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { param, value });
            }
        }
        for (param, value) in [
            ("fee_rate", self.fee_rate),
            ("risk_pct_dynamic", self.risk_pct_dynamic),
            ("min_size", self.min_size),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { param, value });
            }
        }
        if self.min_size > self.max_size {
            return Err(ConfigError::SizeBounds {
                min: self.min_size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Effective risk fraction at the current balance: the static term plus
    /// a term proportional to how the balance compares to the starting
    /// balance, capped at `risk_pct_cap`.
    pub fn risk_fraction(&self, balance: f64) -> f64 {
        let dynamic = self.risk_pct_dynamic * (balance / self.initial_balance);
        (self.risk_pct + dynamic).min(self.risk_pct_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(StrategyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let cfg = StrategyConfig {
            rsi_oversold: 70.0,
            rsi_overbought: 30.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn rejects_zero_sl_multiplier() {
        let cfg = StrategyConfig {
            sl_multiplier: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                param: "sl_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn rejects_risk_fraction_above_one() {
        let cfg = StrategyConfig {
            risk_pct: 1.5,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::RiskFraction(1.5)));
    }

    #[test]
    fn unknown_platform_string_is_rejected() {
        let err = serde_json::from_str::<Platform>("\"kraken\"");
        assert!(err.is_err());
        let ok: Platform = serde_json::from_str("\"metatrader\"").unwrap();
        assert_eq!(ok, Platform::Metatrader);
    }

    #[test]
    fn dynamic_risk_grows_with_balance_and_caps() {
        let cfg = StrategyConfig {
            risk_pct: 0.01,
            risk_pct_dynamic: 0.01,
            risk_pct_cap: 0.025,
            ..Default::default()
        };
        assert!((cfg.risk_fraction(100_000.0) - 0.02).abs() < 1e-12);
        // Tripled balance would give 0.04; the cap holds it at 0.025.
        assert!((cfg.risk_fraction(300_000.0) - 0.025).abs() < 1e-12);
    }
}
