//! Wall-clock helpers for banners and for test data that needs dates.

use chrono::{Local, TimeDelta};

/// Format used by the narrative log banners.
pub const BANNER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftUnit {
    Weeks,
    Days,
    Minutes,
    Seconds,
}

impl ShiftUnit {
    fn delta(self, amount: i64) -> Option<TimeDelta> {
        match self {
            ShiftUnit::Weeks => TimeDelta::try_weeks(amount),
            ShiftUnit::Days => TimeDelta::try_days(amount),
            ShiftUnit::Minutes => TimeDelta::try_minutes(amount),
            ShiftUnit::Seconds => TimeDelta::try_seconds(amount),
        }
    }
}

/// Current local time as used in banners.
pub fn now_stamp() -> String {
    Local::now().format(BANNER_FORMAT).to_string()
}

/// Local time shifted by `amount` units, formatted with `fmt` (strftime).
/// An out-of-range shift leaves the time unshifted.
pub fn shifted_now(fmt: &str, unit: ShiftUnit, amount: i64) -> String {
    let now = Local::now();
    let shifted = unit
        .delta(amount)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now);
    shifted.format(fmt).to_string()
}

/// `%Y-%m-%d` ten days from now.
pub fn default_shifted_date() -> String {
    shifted_now("%Y-%m-%d", ShiftUnit::Days, 10)
}
