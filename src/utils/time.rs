//! Calendar-day helpers.
//!
//! All day boundaries are UTC. A day `d` covers `[d 00:00, d+1 00:00)`.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Midnight UTC at the start of `day`.
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// Half-open window `[start, end)` covering the days `from..=to`.
pub fn days_window(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (day_start(from), day_start(to) + Duration::days(1))
}

/// Half-open window covering a single day.
pub fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    days_window(day, day)
}

/// Humanized timestamp used in reports, e.g. `2025-08-20 14:05`.
pub fn format_report_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
