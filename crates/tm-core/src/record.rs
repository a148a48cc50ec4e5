use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A record field value after decoding. JSON values that are neither
/// numbers nor strings never make it this far.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// One input row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a flat JSON object. Booleans, nulls, arrays and nested objects
    /// are dropped without notice.
    pub fn from_json(object: serde_json::Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .filter_map(|(name, value)| {
                let decoded = match value {
                    Value::Number(n) => FieldValue::Number(n.as_f64()?),
                    Value::String(s) => FieldValue::Text(s),
                    _ => return None,
                };
                Some((name, decoded))
            })
            .collect();
        Self { fields }
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-record problems that degrade a record without aborting the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordIssue {
    #[error("time value {value:?} matches none of the configured formats")]
    UnparseableTime { value: String },
    #[error("field {field:?} value {value:?} is not of the form \"<number> (<number>%)\"")]
    MalformedCompositeField { field: String, value: String },
    #[error("timestamp {timestamp} cannot be written with nanosecond precision")]
    TimestampOutOfRange { timestamp: DateTime<Utc> },
}
