//! Wire date strings
//!
//! The backend exchanges dates as local-time strings without a timezone
//! (`2024-05-01T18:30:00`). Reads are lenient: fractional seconds, RFC 3339
//! and RFC 2822 (what the backend's JSON encoder emits) are accepted, and
//! anything else falls back to the caller's "now".

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format written to the backend
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const WIRE_DATE_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format a Unix ms timestamp as a local wire date
#[must_use]
pub fn format_wire_date(unix_ms: i64) -> String {
    Local
        .timestamp_millis_opt(unix_ms)
        .earliest()
        .map(|date| date.format(WIRE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse a wire date into Unix ms, if it is readable
#[must_use]
pub fn try_parse_wire_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, WIRE_DATE_PARSE_FORMAT) {
        return naive
            .and_local_timezone(Local)
            .earliest()
            .map(|date| date.timestamp_millis());
    }

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|date| date.timestamp_millis())
}

/// Parse a wire date, falling back to `now_ms` when absent or unreadable
#[must_use]
pub fn parse_wire_date(raw: Option<&str>, now_ms: i64) -> i64 {
    match raw.and_then(try_parse_wire_date) {
        Some(parsed) => parsed,
        None => {
            if let Some(raw) = raw {
                tracing::debug!("Unreadable wire date {raw:?}, using now");
            }
            now_ms
        }
    }
}
