//! # Date Handling Utilities
//!
//! Formatting helpers for the timestamps and calendar dates that appear in
//! tool payloads: provider epochs, observation timestamps and task due dates.

use chrono::{DateTime, Datelike, Days, NaiveDate, SecondsFormat, Utc};

/// Converts a Unix epoch (seconds) into an ISO-8601 timestamp with millisecond
/// precision, e.g. `2025-10-19T08:00:00.000Z`.
///
/// Returns `None` when the epoch is outside the representable range.
pub fn iso_timestamp_from_epoch(epoch_seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0).map(|date_time| date_time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Formats an ISO-8601 observation timestamp for display.
///
/// # Example
/// ```rust
/// use skydeck_util::date_handling::format_observed_at;
///
/// assert_eq!(format_observed_at("2025-10-19T15:04:00Z"), "Sun, Oct 19, 3:04 PM");
/// assert_eq!(format_observed_at("yesterday"), "Unknown");
/// ```
pub fn format_observed_at(iso_timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(iso_timestamp.trim()) {
        Ok(date_time) => date_time.with_timezone(&Utc).format("%a, %b %-d, %-I:%M %p").to_string(),
        Err(_) => "Unknown".to_string(),
    }
}

/// The calendar date `days` after `today`, as `YYYY-MM-DD`.
pub fn due_date_after(today: NaiveDate, days: u64) -> String {
    today
        .checked_add_days(Days::new(days))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// Formats a date string into MM/DD/YYYY format.
///
/// Accepts RFC3339 timestamps and `YYYY-MM-DD` / `YYYY/MM/DD` dates.
///
/// # Example
/// ```rust
/// use skydeck_util::date_handling::format_date_mmddyyyy;
///
/// assert_eq!(format_date_mmddyyyy("2023-12-25"), Some("12/25/2023".to_string()));
/// assert_eq!(format_date_mmddyyyy("2023-13-45"), None);
/// ```
pub fn format_date_mmddyyyy(date_string: &str) -> Option<String> {
    if let Some(formatted) = parse_rfc3339_date(date_string) {
        return Some(formatted);
    }

    parse_iso_date(date_string)
}

fn parse_rfc3339_date(date_string: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(date_string).ok().map(|date_time| {
        let date = date_time.date_naive();
        format!("{:02}/{:02}/{}", date.month(), date.day(), date.year())
    })
}

fn parse_iso_date(date_string: &str) -> Option<String> {
    let formats = ["%Y-%m-%d", "%Y/%m/%d"];

    for format_string in formats.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(date_string, format_string) {
            return Some(format!("{:02}/{:02}/{}", date.month(), date.day(), date.year()));
        }
    }

    None
}
