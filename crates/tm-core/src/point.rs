use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

/// Field name used for every fanned-out point.
pub const FANOUT_FIELD: &str = "value";

/// One time-series observation handed to a [`PointSink`](crate::sink::PointSink).
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub labels: BTreeMap<String, String>,
    pub fields: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

/// Turn one kept record into points.
///
/// - No values: nothing is emitted.
/// - The stream has a default label `L`: one point per value, with the
///   single field `value` and the extra label `L = <field name>`.
/// - Otherwise: one point carrying every value and label.
pub fn emit(
    stream: &str,
    values: &BTreeMap<String, f64>,
    labels: &BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
    default_labels: &HashMap<String, String>,
) -> Vec<Point> {
    if values.is_empty() {
        return Vec::new();
    }

    match default_labels.get(stream) {
        Some(label_name) => values
            .iter()
            .map(|(field, value)| {
                let mut point_labels = labels.clone();
                point_labels.insert(label_name.clone(), field.clone());
                Point {
                    measurement: stream.to_string(),
                    labels: point_labels,
                    fields: BTreeMap::from([(FANOUT_FIELD.to_string(), *value)]),
                    timestamp,
                }
            })
            .collect(),
        None => vec![Point {
            measurement: stream.to_string(),
            labels: labels.clone(),
            fields: values.clone(),
            timestamp,
        }],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn single_point_without_default_label() {
        let points = emit(
            "cpu",
            &values(&[("user", 12.5), ("system", 3.0)]),
            &labels(&[("host", "web-1")]),
            ts(),
            &HashMap::new(),
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].measurement, "cpu");
        assert_eq!(points[0].fields, values(&[("user", 12.5), ("system", 3.0)]));
        assert_eq!(points[0].labels, labels(&[("host", "web-1")]));
        assert_eq!(points[0].timestamp, ts());
    }

    #[test]
    fn default_label_fans_out() {
        let defaults = HashMap::from([("http_status".to_string(), "status".to_string())]);
        let points = emit(
            "http_status",
            &values(&[("ok", 10.0), ("error", 2.0)]),
            &BTreeMap::new(),
            ts(),
            &defaults,
        );
        assert_eq!(points.len(), 2);

        let ok = points.iter().find(|p| p.labels["status"] == "ok").unwrap();
        assert_eq!(ok.fields, values(&[("value", 10.0)]));
        assert_eq!(ok.labels, labels(&[("status", "ok")]));

        let err = points.iter().find(|p| p.labels["status"] == "error").unwrap();
        assert_eq!(err.fields, values(&[("value", 2.0)]));
        assert_eq!(err.labels, labels(&[("status", "error")]));

        assert!(points.iter().all(|p| p.measurement == "http_status" && p.timestamp == ts()));
    }

    #[test]
    fn fanout_keeps_record_labels() {
        let defaults = HashMap::from([("http_status".to_string(), "status".to_string())]);
        let points = emit(
            "http_status",
            &values(&[("ok", 10.0)]),
            &labels(&[("host", "web-1")]),
            ts(),
            &defaults,
        );
        assert_eq!(points[0].labels, labels(&[("host", "web-1"), ("status", "ok")]));
    }

    #[test]
    fn default_label_for_other_stream_is_ignored() {
        let defaults = HashMap::from([("http_status".to_string(), "status".to_string())]);
        let points = emit("cpu", &values(&[("a", 1.0), ("b", 2.0)]), &BTreeMap::new(), ts(), &defaults);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fields.len(), 2);
    }

    #[test]
    fn empty_values_emit_nothing() {
        let defaults = HashMap::from([("cpu".to_string(), "kind".to_string())]);
        assert!(emit("cpu", &BTreeMap::new(), &labels(&[("host", "a")]), ts(), &defaults).is_empty());
        assert!(emit("cpu", &BTreeMap::new(), &labels(&[("host", "a")]), ts(), &HashMap::new()).is_empty());
    }
}
