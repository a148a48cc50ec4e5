use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Separates the stream token from the rest of the filename.
pub const STREAM_SEPARATOR: char = '_';
/// Marks the end of the compact timestamp token.
pub const TIMESTAMP_MARKER: &str = "Z-";
/// Layout of the compact timestamp embedded in filenames.
pub const COMPACT_TIMESTAMP: &str = "%Y%m%dT%H%M%SZ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("filename {0:?} has no '_' separator")]
    MissingSeparator(String),
    #[error("filename {0:?} has no 'Z-' timestamp marker")]
    MissingTimestamp(String),
    #[error("filename {0:?} yields an empty stream name")]
    EmptyStream(String),
}

/// What a filename says about its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Canonical snake_case stream name.
    pub name: String,
    /// Timestamp for records that carry none of their own.
    pub fallback: DateTime<Utc>,
    /// Whether `fallback` came from the filename (`false` means run start).
    pub from_filename: bool,
}

/// Derive the stream descriptor from `<token>_<prefix>YYYYMMDDThhmmssZ-<suffix>`.
///
/// An embedded timestamp that does not parse is not an error; `run_started`
/// is used instead.
pub fn identify(path: &Path, run_started: DateTime<Utc>) -> Result<StreamDescriptor, FilenameError> {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sep = basename
        .find(STREAM_SEPARATOR)
        .ok_or_else(|| FilenameError::MissingSeparator(basename.clone()))?;
    let rest = &basename[sep + STREAM_SEPARATOR.len_utf8()..];
    let marker = rest
        .find(TIMESTAMP_MARKER)
        .ok_or_else(|| FilenameError::MissingTimestamp(basename.clone()))?;

    // Keep the trailing `Z` of the marker as part of the token.
    let token = &rest[..marker + 1];
    let parsed = NaiveDateTime::parse_from_str(token, COMPACT_TIMESTAMP)
        .ok()
        .map(|naive| naive.and_utc());

    let name = to_snake_case(&basename[..sep]);
    if name.is_empty() {
        return Err(FilenameError::EmptyStream(basename));
    }

    Ok(StreamDescriptor {
        name,
        fallback: parsed.unwrap_or(run_started),
        from_filename: parsed.is_some(),
    })
}

/// Normalise a raw token to snake_case.
///
/// Word boundaries come from lower/digit → upper transitions, from the last
/// capital of an acronym followed by a lowercase letter, and from runs of
/// non-alphanumeric characters, which collapse to a single `_`.
pub fn to_snake_case(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let mut out = String::with_capacity(token.len() + 4);
    let mut pending_sep = false;

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            pending_sep = !out.is_empty();
            continue;
        }
        if c.is_uppercase() && i > 0 && !out.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                pending_sep = true;
            }
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn identify_plain_filename() {
        let d = identify(Path::new("cpu_20240115T120000Z-suffix.json"), run_start()).unwrap();
        assert_eq!(d.name, "cpu");
        assert_eq!(d.fallback, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
        assert!(d.from_filename);
    }

    #[test]
    fn identify_uses_base_name() {
        let d = identify(
            Path::new("/data/in_box/HttpStatus_20240301T000000Z-export.json"),
            run_start(),
        )
        .unwrap();
        assert_eq!(d.name, "http_status");
    }

    #[test]
    fn missing_separator() {
        let err = identify(Path::new("cpu-20240115T120000Z-suffix.json"), run_start()).unwrap_err();
        assert!(matches!(err, FilenameError::MissingSeparator(_)));
    }

    #[test]
    fn missing_marker() {
        let err = identify(Path::new("cpu_20240115T120000.json"), run_start()).unwrap_err();
        assert!(matches!(err, FilenameError::MissingTimestamp(_)));
    }

    #[test]
    fn bad_timestamp_falls_back_to_run_start() {
        let d = identify(Path::new("cpu_export99Z-x.json"), run_start()).unwrap();
        assert_eq!(d.name, "cpu");
        assert_eq!(d.fallback, run_start());
        assert!(!d.from_filename);
    }

    #[test]
    fn prefixed_timestamp_falls_back() {
        let d = identify(Path::new("cpu_daily20240115T120000Z-x.json"), run_start()).unwrap();
        assert_eq!(d.fallback, run_start());
    }

    #[test]
    fn empty_stream_token() {
        let err = identify(Path::new("_20240115T120000Z-x.json"), run_start()).unwrap_err();
        assert!(matches!(err, FilenameError::EmptyStream(_)));
    }

    #[test]
    fn snake_case_rules() {
        assert_eq!(to_snake_case("cpu"), "cpu");
        assert_eq!(to_snake_case("HttpStatus"), "http_status");
        assert_eq!(to_snake_case("httpStatus"), "http_status");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("queue-depth"), "queue_depth");
        assert_eq!(to_snake_case("Queue  Depth"), "queue_depth");
        assert_eq!(to_snake_case("--disk.io--"), "disk_io");
        assert_eq!(to_snake_case("CPU"), "cpu");
        assert_eq!(to_snake_case("load5Min"), "load5_min");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn snake_case_is_idempotent() {
        for token in ["HttpStatus", "queue-depth", "HTTPServer", "already_snake"] {
            let once = to_snake_case(token);
            assert_eq!(to_snake_case(&once), once);
        }
    }
}
