use std::path::Path;
use std::sync::Arc;

use orion_error::ErrorOwe;
use orion_error::prelude::*;
use tm_config::{IngestConfig, SinkUri};
use tm_core::error::CoreReason;
use tm_core::sink::{FanOutSink, LineProtocolSink, PointSink};

use crate::error::{RuntimeReason, RuntimeResult};

/// Build the point sink from config, supporting stdout and multiple
/// `file://` destinations.
///
/// Relative `file://` paths are resolved against `base_dir` (the directory
/// containing `tidemark.toml`), so `file://out/points.lp` lands next to the
/// config rather than relative to CWD.
pub fn build_point_sink(config: &IngestConfig, base_dir: &Path) -> RuntimeResult<Arc<dyn PointSink>> {
    let mut sinks: Vec<Box<dyn PointSink>> = Vec::with_capacity(config.sinks.len());
    for uri in &config.sinks {
        match uri.resolve(base_dir) {
            SinkUri::Stdout => {
                sinks.push(Box::new(LineProtocolSink::stdout()));
                tm_debug!(res, "opened stdout point sink");
            }
            SinkUri::File { path } => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).owe_sys()?;
                }
                let sink = LineProtocolSink::open(&path).map_err(|e| {
                    StructError::from(RuntimeReason::Core(CoreReason::Sink))
                        .with_detail(format!("failed to open {}: {e}", path.display()))
                })?;
                sinks.push(Box::new(sink));
                tm_debug!(res, path = %path.display(), "opened file point sink");
            }
        }
    }

    let mut sinks = sinks.into_iter();
    Ok(match (sinks.next(), sinks.len()) {
        (Some(only), 0) => Arc::from(only),
        (first, _) => Arc::new(FanOutSink::new(first.into_iter().chain(sinks).collect())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tm_core::Point;

    #[test]
    fn relative_file_sinks_land_in_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config: IngestConfig = r#"sinks = ["file://out/a.lp", "file://out/b.lp"]"#
            .parse()
            .unwrap();

        let sink = build_point_sink(&config, dir.path()).unwrap();
        sink.write_point(&Point {
            measurement: "cpu".to_string(),
            labels: BTreeMap::new(),
            fields: BTreeMap::from([("user".to_string(), 1.0)]),
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
        })
        .unwrap();
        sink.flush().unwrap();

        for name in ["a.lp", "b.lp"] {
            let contents = std::fs::read_to_string(dir.path().join("out").join(name)).unwrap();
            assert_eq!(contents, "cpu user=1 0\n");
        }
    }
}
