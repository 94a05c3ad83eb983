//! Timestamps are stored and returned as UTC RFC 3339 strings with
//! whole seconds (`2024-01-01T09:00:00Z`). Keeping one canonical form
//! means lexical comparison in SQL matches chronological order.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

use super::error::{Error, Result};

/// Years that format as exactly four digits. SQLite date functions
/// return NULL outside this range.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Longest event or task accepted, one year in minutes.
pub const MAX_DURATION_MINUTES: i64 = 366 * 24 * 60;

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(value.to_string()))?;
    ensure_storable(parsed)
}

/// Reject timestamps whose canonical form would not be four-digit
/// year text.
pub fn ensure_storable(value: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if STORABLE_YEARS.contains(&value.year()) {
        Ok(value)
    } else {
        Err(Error::InvalidDate(format_timestamp(&value)))
    }
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse any RFC 3339 timestamp and return it in canonical form.
pub fn normalize_timestamp(value: &str) -> Result<String> {
    parse_timestamp(value).map(|dt| format_timestamp(&dt))
}
