//! Time parsing and formatting utilities shared by the fetch adapters.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Resolve a `month/day` reset date to its next occurrence relative to
/// `now`, in UTC at midnight.
///
/// A date equal to today resolves to today (the reset is assumed to land
/// later in the current day); the year rolls forward only when the
/// month/day is strictly in the past. Returns `None` for invalid dates,
/// including a Feb 29 that does not exist in the target year.
#[must_use]
pub fn next_month_day(now: DateTime<Utc>, month: u32, day: u32) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    let date = match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(d) if d >= today => d,
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day)?,
    };
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Description for a relative expiry given in whole days: `"3d left"`.
#[must_use]
pub fn days_left_description(days: i64) -> String {
    format!("{days}d left")
}

/// Format a countdown to a future time relative to `now`.
#[must_use]
pub fn format_countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = target.signed_duration_since(now);

    if duration.num_seconds() <= 0 {
        return "now".to_string();
    }

    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;

    if hours > 24 {
        let days = hours / 24;
        format!("in {days} day{}", if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("in {hours}h {minutes}m")
    } else if minutes > 0 {
        format!("in {minutes}m")
    } else {
        let seconds = duration.num_seconds();
        format!("in {seconds}s")
    }
}
