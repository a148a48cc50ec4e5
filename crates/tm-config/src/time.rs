use serde::Deserialize;

use crate::types::TimeFormat;

/// `[time]` section: which record field carries the timestamp and the
/// layouts to try, in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub field: String,
    pub formats: Vec<TimeFormat>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            field: "time".to_string(),
            formats: vec![TimeFormat::Pattern("%Y-%m-%d".to_string())],
        }
    }
}
