pub mod line_protocol;
mod memory;
mod writer;

use anyhow::Result;

use crate::point::Point;

pub use memory::MemorySink;
pub use writer::LineProtocolSink;

/// Destination for emitted points.
///
/// `write_point` is called once per point as soon as it is emitted. `flush`
/// is called after the last point of a file, before that file's watermark is
/// committed.
pub trait PointSink: Send + Sync {
    fn write_point(&self, point: &Point) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: PointSink + ?Sized> PointSink for std::sync::Arc<T> {
    fn write_point(&self, point: &Point) -> Result<()> {
        (**self).write_point(point)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Broadcasts points to multiple sinks.
///
/// Continues with the remaining sinks when one fails and returns the first
/// error encountered, if any.
pub struct FanOutSink {
    sinks: Vec<Box<dyn PointSink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Box<dyn PointSink>>) -> Self {
        Self { sinks }
    }

    fn for_each(&self, f: impl Fn(&dyn PointSink) -> Result<()>) -> Result<()> {
        let mut first_err: Option<anyhow::Error> = None;
        for sink in &self.sinks {
            if let Err(e) = f(sink.as_ref()) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl PointSink for FanOutSink {
    fn write_point(&self, point: &Point) -> Result<()> {
        self.for_each(|sink| sink.write_point(point))
    }

    fn flush(&self) -> Result<()> {
        self.for_each(|sink| sink.flush())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn sample_point() -> Point {
        Point {
            measurement: "cpu".to_string(),
            labels: BTreeMap::new(),
            fields: BTreeMap::from([("user".to_string(), 1.0)]),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        }
    }

    /// Sink that always fails.
    struct FailSink;

    impl PointSink for FailSink {
        fn write_point(&self, _point: &Point) -> Result<()> {
            anyhow::bail!("intentional failure");
        }
    }

    #[test]
    fn fanout_continues_after_failure() {
        let s1 = Arc::new(MemorySink::new());
        let s2 = Arc::new(MemorySink::new());

        let sink = FanOutSink::new(vec![
            Box::new(Arc::clone(&s1)),
            Box::new(FailSink),
            Box::new(Arc::clone(&s2)),
        ]);

        let result = sink.write_point(&sample_point());
        assert!(result.is_err()); // first error propagated
        assert_eq!(s1.len(), 1);
        assert_eq!(s2.len(), 1);
    }

    #[test]
    fn fanout_flush_reaches_every_sink() {
        let s1 = Arc::new(MemorySink::new());
        let sink = FanOutSink::new(vec![Box::new(Arc::clone(&s1)), Box::new(FailSink)]);
        sink.write_point(&sample_point()).ok();
        assert!(sink.flush().is_ok());
        assert_eq!(s1.flushes(), 1);
    }

    #[test]
    fn fanout_empty_returns_ok() {
        let sink = FanOutSink::new(vec![]);
        assert!(sink.write_point(&sample_point()).is_ok());
    }
}
