//! InfluxDB line protocol encoding.
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=1.5,field2=3 timestamp_ns
//! ```
//!
//! Labels become tags and are written in key order. Every field is a float.

use anyhow::Result;

use crate::point::Point;

/// Encode one point as a single line (without trailing newline).
///
/// Tags with an empty value are omitted. Non-finite field values are an
/// error since line protocol has no representation for them.
pub fn encode(point: &Point) -> Result<String> {
    if point.fields.is_empty() {
        anyhow::bail!("point {:?} has no fields", point.measurement);
    }
    if let Some((key, value)) = point.fields.iter().find(|(_, v)| !v.is_finite()) {
        anyhow::bail!("field {key:?} of {:?} is not finite: {value}", point.measurement);
    }
    let ts = point.timestamp.timestamp_nanos_opt().ok_or_else(|| {
        anyhow::anyhow!(
            "timestamp {} is outside the nanosecond range",
            point.timestamp
        )
    })?;

    let mut line = escape_measurement(&point.measurement);
    for (key, value) in point.labels.iter().filter(|(_, v)| !v.is_empty()) {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    let fields = point
        .fields
        .iter()
        .map(|(key, value)| format!("{}={value}", escape_key(key)))
        .collect::<Vec<_>>()
        .join(",");

    Ok(format!("{line} {fields} {ts}"))
}

/// Spaces and commas must be escaped in measurement names. Newlines would
/// end the line, so they are written as a literal `\n`.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,")
        .replace(' ', "\\ ")
        .replace('\n', "\\n")
}

/// Commas, equals signs and spaces must be escaped in tag keys, tag values
/// and field keys.
fn escape_key(s: &str) -> String {
    escape_measurement(s).replace('=', "\\=")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn point(labels: &[(&str, &str)], fields: &[(&str, f64)]) -> Point {
        Point {
            measurement: "http_status".to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            timestamp: Utc.timestamp_opt(1, 0).unwrap(),
        }
    }

    #[test]
    fn simple_point() {
        let line = encode(&point(&[], &[("value", 23.5)])).unwrap();
        assert_eq!(line, "http_status value=23.5 1000000000");
    }

    #[test]
    fn tags_sorted_and_fields_joined() {
        let line = encode(&point(
            &[("status", "ok"), ("host", "web-1")],
            &[("pc", 15.7), ("count", 315.0)],
        ))
        .unwrap();
        assert_eq!(line, "http_status,host=web-1,status=ok count=315,pc=15.7 1000000000");
    }

    #[test]
    fn escapes_special_characters() {
        let mut p = point(&[("dc name", "eu,west=1")], &[("a b", 1.0)]);
        p.measurement = "my metric".to_string();
        let line = encode(&p).unwrap();
        assert_eq!(line, "my\\ metric,dc\\ name=eu\\,west\\=1 a\\ b=1 1000000000");
    }

    #[test]
    fn reject_empty_fields() {
        let p = Point {
            fields: BTreeMap::new(),
            ..point(&[], &[])
        };
        assert!(encode(&p).is_err());
    }

    #[test]
    fn empty_label_values_are_omitted() {
        let line = encode(&point(&[("host", ""), ("status", "ok")], &[("value", 1.0)])).unwrap();
        assert_eq!(line, "http_status,status=ok value=1 1000000000");
    }

    #[test]
    fn newlines_never_split_a_line() {
        let mut p = point(&[("note", "a\nb"), ("x\ny", "1")], &[("v\nw", 1.0)]);
        p.measurement = "http\nstatus".to_string();
        let line = encode(&p).unwrap();
        assert!(!line.contains('\n'), "{line}");
        assert_eq!(
            line,
            "http\\nstatus,note=a\\nb,x\\ny=1 v\\nw=1 1000000000"
        );
    }

    #[test]
    fn reject_non_finite_fields() {
        assert!(encode(&point(&[], &[("count", f64::NAN)])).is_err());
        assert!(encode(&point(&[], &[("pc", f64::INFINITY)])).is_err());
        assert!(encode(&point(&[], &[("pc", f64::NEG_INFINITY)])).is_err());
    }
}
