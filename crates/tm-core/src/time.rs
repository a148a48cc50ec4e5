use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tm_config::TimeFormat;

use crate::record::{FieldValue, Record, RecordIssue};

/// How a record's effective timestamp was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The time field parsed under one of the candidate formats.
    Parsed(DateTime<Utc>),
    /// The time field was absent or not text; the file fallback applies.
    Defaulted(DateTime<Utc>),
    /// The time field was text but no format matched. The record continues
    /// with the file fallback and the issue is reported.
    Unparseable {
        fallback: DateTime<Utc>,
        issue: RecordIssue,
    },
}

impl Resolution {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Parsed(ts) | Self::Defaulted(ts) => *ts,
            Self::Unparseable { fallback, .. } => *fallback,
        }
    }

    pub fn issue(&self) -> Option<&RecordIssue> {
        match self {
            Self::Unparseable { issue, .. } => Some(issue),
            _ => None,
        }
    }
}

/// Determine the effective timestamp of `record`.
pub fn resolve(
    record: &Record,
    time_field: &str,
    formats: &[TimeFormat],
    fallback: DateTime<Utc>,
) -> Resolution {
    let Some(FieldValue::Text(value)) = record.get(time_field) else {
        return Resolution::Defaulted(fallback);
    };
    match formats.iter().find_map(|f| parse_time(f, value)) {
        Some(ts) => Resolution::Parsed(ts),
        None => Resolution::Unparseable {
            fallback,
            issue: RecordIssue::UnparseableTime {
                value: value.clone(),
            },
        },
    }
}

/// Reject timestamps outside the nanosecond range points are written in
/// (roughly 1677-09-21 to 2262-04-11).
pub fn check_range(ts: DateTime<Utc>) -> Result<DateTime<Utc>, RecordIssue> {
    match ts.timestamp_nanos_opt() {
        Some(_) => Ok(ts),
        None => Err(RecordIssue::TimestampOutOfRange { timestamp: ts }),
    }
}

/// Parse `value` under a single format.
///
/// A strftime pattern is tried as a zoned date-time, then as a naive
/// date-time in UTC, then as a bare date at midnight UTC.
pub fn parse_time(format: &TimeFormat, value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    match format {
        TimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        TimeFormat::Rfc2822 => DateTime::parse_from_rfc2822(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        TimeFormat::Pattern(pattern) => DateTime::parse_from_str(value, pattern)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(value, pattern).map(|n| n.and_utc()))
            .or_else(|_| {
                NaiveDate::parse_from_str(value, pattern)
                    .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
            })
            .ok(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
