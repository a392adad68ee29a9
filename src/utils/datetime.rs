//! Date and time utility functions
//!
//! The marketplace API is not consistent about timestamp formats, so listing
//! dates are parsed with several strategies and rendered in a short
//! human-readable form ("today", "3 days ago", "Jan 15").

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Standard date format used by the API for date-only values
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp sent by the API.
///
/// Accepts RFC 3339 (`2025-01-15T14:30:00Z`), ISO 8601 without a zone
/// (`2025-01-15T14:30:00`, interpreted as UTC), space separated
/// (`2025-01-15 14:30:00`) and plain dates (`2025-01-15`, midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    NaiveDate::parse_from_str(value, API_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Human-readable listing date relative to `today`
///
/// # Returns
/// * `"today"`, `"yesterday"`, `"N days ago"` within a month, then
///   `"Jan 15"` for the current year and `"Jan 15, 2024"` otherwise
pub fn format_listed(listed: NaiveDate, today: NaiveDate) -> String {
    let days_ago = (today - listed).num_days();

    match days_ago {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        diff if diff > 1 && diff <= 30 => format!("{} days ago", diff),
        _ => {
            if listed.year() == today.year() {
                listed.format("%b %d").to_string()
            } else {
                listed.format("%b %d, %Y").to_string()
            }
        }
    }
}

/// Format a listing timestamp relative to the current local date
pub fn format_listed_now(listed: &DateTime<Utc>) -> String {
    format_listed(listed.with_timezone(&Local).date_naive(), Local::now().date_naive())
}

/// Current calendar year in local time
pub fn current_year() -> i32 {
    Local::now().year()
}
