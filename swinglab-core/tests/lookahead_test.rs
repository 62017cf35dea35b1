//! Higher-timeframe bars must stay invisible until they have closed.
//!
//! The trend series is daily while execution is hourly, so during any
//! trading day the current daily bar is still forming. Its close is
//! unknowable at execution time; the run must produce identical output
//! whether that bar is absent, or present with any value at all.

use chrono::{Duration, TimeZone, Utc};
use swinglab_core::domain::Bar;
use swinglab_core::{Backtester, StrategyConfig};

fn hourly_bars(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: base + Duration::hours(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        })
        .collect()
}

fn daily_bar(day: u32, close: f64) -> Bar {
    Bar {
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000.0,
    }
}

#[test]
fn forming_higher_tf_bar_cannot_influence_the_run() {
    // A series that trades: RSI(2) dips at bar 3 and crosses back up at
    // bar 4, with the higher timeframe trending up.
    let closes = [
        100.0, 101.0, 102.0, 94.0, 96.0, 98.0, 100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 107.0,
        104.0, 101.5,
    ];
    let exec = hourly_bars(&closes);
    let config = StrategyConfig {
        rsi_period: 2,
        atr_period: 2,
        ..Default::default()
    };

    // Closed daily bars: Jan 1 through Jan 9.
    let closed: Vec<Bar> = (1..=9).map(|d| daily_bar(d, 99.0 + d as f64)).collect();

    // The Jan 10 bar closes at Jan 11 00:00, after every execution bar.
    let mut with_crash = closed.clone();
    with_crash.push(daily_bar(10, 1.0)); // would flip the trend bearish
    let mut with_spike = closed.clone();
    with_spike.push(daily_bar(10, 1_000_000.0));

    let engine = Backtester::new(config).unwrap();
    let baseline = engine.run(&exec, &closed).unwrap();
    let crash = engine.run(&exec, &with_crash).unwrap();
    let spike = engine.run(&exec, &with_spike).unwrap();

    // The baseline actually trades, so the comparison is not vacuous.
    assert_eq!(baseline.trades.len(), 1);

    let baseline_json = serde_json::to_string(&baseline).unwrap();
    assert_eq!(baseline_json, serde_json::to_string(&crash).unwrap());
    assert_eq!(baseline_json, serde_json::to_string(&spike).unwrap());
}

#[test]
fn closed_higher_tf_bars_do_influence_the_run() {
    // Control for the test above: changing a bar that HAS closed changes
    // the outcome (a sideways trend blocks the entry in both directions).
    let closes = [100.0, 101.0, 102.0, 94.0, 96.0, 98.0, 100.0, 102.0];
    let exec = hourly_bars(&closes);
    let config = StrategyConfig {
        rsi_period: 2,
        atr_period: 2,
        ..Default::default()
    };

    let rising: Vec<Bar> = (1..=9).map(|d| daily_bar(d, 99.0 + d as f64)).collect();
    let sideways: Vec<Bar> = (1..=9).map(|d| daily_bar(d, 110.0)).collect();

    let engine = Backtester::new(config).unwrap();
    let up = engine.run(&exec, &rising).unwrap();
    let flat = engine.run(&exec, &sideways).unwrap();

    assert!(!up.audit.is_empty());
    assert_eq!(flat.trades.len(), 0);
    assert!(flat
        .equity_curve
        .iter()
        .all(|p| p.state == swinglab_core::domain::PositionSide::Flat));
}
