//! Timestamp helpers
//!
//! Event dates are local ISO-8601 strings with microseconds and no offset,
//! e.g. `2024-03-01T10:00:00.123456`.

use chrono::{Local, NaiveDateTime};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time formatted for an event `date` field
pub fn now_iso() -> String {
    format_iso(&Local::now().naive_local())
}

/// Format a timestamp for an event `date` field
pub fn format_iso(timestamp: &NaiveDateTime) -> String {
    timestamp.format(ISO_FORMAT).to_string()
}

/// Shorten an event date to seconds precision for table output
pub fn display_date(date: &str) -> &str {
    date.get(..19).unwrap_or(date)
}
