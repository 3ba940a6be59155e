use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::errors::ModelError;

/// Parse a point in time. `YYYY-MM-DD` means midnight UTC of that day; an
/// RFC 3339 timestamp keeps its time and is converted to UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ModelError> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ModelError::InvalidDate(raw.to_string()))
}

/// ISO-8601 instant in UTC with millisecond precision, e.g. `2025-10-05T19:24:00.123Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
