use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use serde::de;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// TimeFormat
// ---------------------------------------------------------------------------

/// One candidate layout for the record time field.
///
/// Parsed from `"rfc3339"`, `"rfc2822"`, or any chrono `strftime` pattern
/// such as `"%Y-%m-%d %H:%M:%S"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    Rfc3339,
    Rfc2822,
    Pattern(String),
}

impl FromStr for TimeFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        if s.trim().is_empty() {
            anyhow::bail!("empty time format");
        }
        match s.to_ascii_lowercase().as_str() {
            "rfc3339" => return Ok(Self::Rfc3339),
            "rfc2822" => return Ok(Self::Rfc2822),
            _ => {}
        }
        if StrftimeItems::new(s).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("invalid strftime pattern {s:?}");
        }
        Ok(Self::Pattern(s.to_string()))
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfc3339 => write!(f, "rfc3339"),
            Self::Rfc2822 => write!(f, "rfc2822"),
            Self::Pattern(p) => write!(f, "{p}"),
        }
    }
}

impl<'de> Deserialize<'de> for TimeFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
