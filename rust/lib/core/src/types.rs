use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Current UTC time, truncated to millisecond precision.
///
/// Millisecond precision matches what [`to_rfc3339`] writes, so a
/// timestamp read back from storage compares equal to the value that
/// was stored.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp as fixed-width RFC 3339 (`2026-01-07T06:30:00.000Z`).
///
/// The fixed width keeps lexicographic order on the stored TEXT column
/// equal to chronological order.
pub fn to_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, normalizing any offset to UTC.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
