//! Session calendar: week-close and reopen-block windows.
//!
//! FX venues close for the weekend; positions held across the close gap at
//! unknowable prices, so the engine force-flattens inside the close window
//! and suppresses fresh entries for a configurable stretch after the
//! reopen. Crypto venues trade around the clock; the default rules are
//! empty and every bar is a normal trading bar.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// End-of-week close window. Runs from `weekday` at `from_hour` (UTC)
/// through the end of Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekClose {
    pub weekday: Weekday,
    pub from_hour: u32,
}

/// Entry suppression after the weekly reopen: `hours` hours starting at
/// `weekday`/`from_hour` (UTC). Exits are unaffected. `from_hour + hours`
/// must not spill past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenBlock {
    pub weekday: Weekday,
    pub from_hour: u32,
    pub hours: u32,
}

/// Session rules for one instrument. All fields optional; `None` means the
/// rule does not apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRules {
    pub week_close: Option<WeekClose>,
    pub reopen_block: Option<ReopenBlock>,
}

impl SessionRules {
    /// Friday 21:00 UTC close, Sunday 22:00 UTC reopen with a 2-hour
    /// entry block, the usual FX week.
    pub fn fx_week() -> Self {
        Self {
            week_close: Some(WeekClose {
                weekday: Weekday::Fri,
                from_hour: 21,
            }),
            reopen_block: Some(ReopenBlock {
                weekday: Weekday::Sun,
                from_hour: 22,
                hours: 2,
            }),
        }
    }

    /// True while the market is winding down for the week: open positions
    /// are force-closed and no entries are taken.
    pub fn in_close_window(&self, ts: DateTime<Utc>) -> bool {
        let Some(wc) = self.week_close else {
            return false;
        };
        let wd = ts.weekday();
        (wd == wc.weekday && ts.hour() >= wc.from_hour) || wd == Weekday::Sat
    }

    /// True during the post-reopen stretch where new entries are
    /// suppressed. Exits are never blocked by this window.
    pub fn in_reopen_block(&self, ts: DateTime<Utc>) -> bool {
        let Some(rb) = self.reopen_block else {
            return false;
        };
        ts.weekday() == rb.weekday
            && ts.hour() >= rb.from_hour
            && ts.hour() < rb.from_hour + rb.hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        // 2024-06-03 is a Monday; day offsets keep the weekday obvious.
        Utc.with_ymd_and_hms(2024, 6, day, hour, 30, 0).unwrap()
    }

    #[test]
    fn default_rules_never_trigger() {
        let rules = SessionRules::default();
        assert!(!rules.in_close_window(at(7, 23))); // Friday night
        assert!(!rules.in_reopen_block(at(9, 22))); // Sunday evening
    }

    #[test]
    fn friday_evening_is_close_window() {
        let rules = SessionRules::fx_week();
        assert!(!rules.in_close_window(at(7, 20))); // Fri 20:30
        assert!(rules.in_close_window(at(7, 21))); // Fri 21:30
        assert!(rules.in_close_window(at(8, 3))); // Saturday
        assert!(!rules.in_close_window(at(9, 12))); // Sunday midday
        assert!(!rules.in_close_window(at(3, 12))); // Monday midday
    }

    #[test]
    fn reopen_block_covers_first_hours_only() {
        let rules = SessionRules::fx_week();
        assert!(!rules.in_reopen_block(at(9, 21))); // Sun 21:30, pre-reopen
        assert!(rules.in_reopen_block(at(9, 22))); // Sun 22:30
        assert!(rules.in_reopen_block(at(9, 23))); // Sun 23:30
        assert!(!rules.in_reopen_block(at(3, 0))); // Monday 00:30
    }
}
