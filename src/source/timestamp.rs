use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::SourceError;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a source-provided date/time into UTC.
///
/// Accepts RFC 3339, Twitch's `%Y-%m-%dT%H:%M:%SZ`, `%Y-%m-%d %H:%M:%S`
/// (naive, taken as UTC) and bare `%Y-%m-%d` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, SourceError> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SourceError::Decode(format!("unrecognized timestamp: {value}")))
}
