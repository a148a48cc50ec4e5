use std::collections::BTreeMap;

use crate::record::{FieldValue, Record, RecordIssue};

/// Field whose text value encodes `"<count> (<percent>%)"`.
pub const COMPOSITE_FIELD: &str = "count_percent";
pub const COMPOSITE_COUNT: &str = "count";
pub const COMPOSITE_PERCENT: &str = "pc";

/// Numeric values and string labels extracted from one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    pub values: BTreeMap<String, f64>,
    pub labels: BTreeMap<String, String>,
    /// Recoverable problems hit while transforming; offending fields are absent.
    pub issues: Vec<RecordIssue>,
}

/// Split `record` into values and labels, skipping `time_field`.
pub fn transform(record: &Record, time_field: &str) -> Transformed {
    let mut out = Transformed::default();

    for (name, value) in record.iter() {
        if name == time_field {
            continue;
        }
        if name == COMPOSITE_FIELD {
            match decode_composite(value) {
                Some((count, pc)) => {
                    out.values.insert(COMPOSITE_COUNT.to_string(), count);
                    out.values.insert(COMPOSITE_PERCENT.to_string(), pc);
                }
                None => out.issues.push(RecordIssue::MalformedCompositeField {
                    field: name.to_string(),
                    value: match value {
                        FieldValue::Text(s) => s.clone(),
                        FieldValue::Number(n) => n.to_string(),
                    },
                }),
            }
            continue;
        }
        match value {
            FieldValue::Number(n) => {
                out.values.insert(name.to_string(), *n);
            }
            FieldValue::Text(s) => {
                out.labels.insert(name.to_string(), s.clone());
            }
        }
    }

    out
}

/// Decode `"315 (15.7%)"` into `(315.0, 15.7)`.
///
/// Exactly two whitespace-separated tokens are required and both must be
/// numbers once the parentheses and percent sign are trimmed from the
/// second. `NaN` and infinities are not numbers here. Anything else yields
/// `None`; no partial decoding.
pub fn decode_composite(value: &FieldValue) -> Option<(f64, f64)> {
    let FieldValue::Text(text) = value else {
        return None;
    };
    let mut tokens = text.split_whitespace();
    let (Some(first), Some(second), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };
    let count = first.parse::<f64>().ok()?;
    let pc = second
        .trim_matches(|c| matches!(c, '(' | '%' | ')'))
        .parse::<f64>()
        .ok()?;
    (count.is_finite() && pc.is_finite()).then_some((count, pc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
