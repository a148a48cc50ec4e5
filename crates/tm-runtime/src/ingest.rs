use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use orion_error::prelude::*;
use serde_json::{Map, Value};
use tm_config::IngestConfig;
use tm_core::error::CoreReason;
use tm_core::sink::PointSink;
use tm_core::{
    PositionStore, Positions, Record, WatermarkFilter, check_range, emit, identify, resolve,
    transform,
};

use crate::error::{RuntimeReason, RuntimeResult};
use crate::summary::{FileSummary, RunSummary};

// ---------------------------------------------------------------------------
// Ingestor: the run driver
// ---------------------------------------------------------------------------

/// Drives one ingestion run over a list of files.
///
/// Positions are loaded twice: the *baseline* decides what is new, the
/// *working* copy collects the advanced watermarks and is saved once after
/// every file succeeded. Any fatal error returns before the save.
pub struct Ingestor {
    config: IngestConfig,
    store: PositionStore,
    sink: Arc<dyn PointSink>,
    run_started: DateTime<Utc>,
}

impl Ingestor {
    pub fn new(
        config: IngestConfig,
        store: PositionStore,
        sink: Arc<dyn PointSink>,
        run_started: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            store,
            sink,
            run_started,
        }
    }

    #[tracing::instrument(name = "ingest.run", skip_all, fields(files = files.len()))]
    pub fn run(&self, files: &[PathBuf]) -> RuntimeResult<RunSummary> {
        let baseline = self.store.load().err_conv()?;
        let mut working = self.store.load().err_conv()?;
        tm_debug!(
            res,
            path = %self.store.path().display(),
            streams = baseline.len(),
            "positions loaded"
        );

        let mut summary = RunSummary::default();
        for path in files {
            let file = match self.ingest_file(path, &baseline, &mut working) {
                Ok(file) => file,
                Err(e) => {
                    tm_error!(
                        sys,
                        file = %path.display(),
                        error = %e,
                        "ingest aborted, positions not saved"
                    );
                    return Err(e);
                }
            };
            tm_info!(
                pipe,
                stream = %file.stream,
                rows = file.rows,
                filtered = file.filtered,
                points = file.points,
                "wrote metrics"
            );
            summary.files.push(file);
        }

        self.store.save(&working).err_conv()?;
        tm_debug!(
            res,
            path = %self.store.path().display(),
            streams = working.len(),
            "positions saved"
        );
        tm_info!(
            sys,
            files = summary.files.len(),
            rows = summary.rows(),
            points = summary.points(),
            issues = summary.issues(),
            "ingest run complete"
        );
        Ok(summary)
    }

    /// Process one file against `baseline`, advancing `working` once every
    /// point of the file has been handed to the sink and flushed.
    #[tracing::instrument(name = "ingest.file", skip_all, fields(file = %path.display()))]
    pub fn ingest_file(
        &self,
        path: &Path,
        baseline: &Positions,
        working: &mut Positions,
    ) -> RuntimeResult<FileSummary> {
        let descriptor = identify(path, self.run_started).map_err(|e| {
            StructError::from(RuntimeReason::Core(CoreReason::MalformedFilename)).with_detail(e.to_string())
        })?;
        if !descriptor.from_filename {
            tm_debug!(pipe, run_started = %self.run_started, "no usable timestamp in filename, defaulting to run start");
        }

        let rows = read_rows(path)?;
        tm_trace!(pipe, count = rows.len(), "read json rows");

        let time = &self.config.time;
        let stream = descriptor.name.as_str();
        let mut filter = WatermarkFilter::new(baseline.get(stream));
        let mut summary = FileSummary::new(stream);

        for (row, object) in rows.into_iter().enumerate() {
            summary.rows += 1;
            let record = Record::from_json(object);

            let resolution = resolve(&record, &time.field, &time.formats, descriptor.fallback);
            if let Some(issue) = resolution.issue() {
                summary.issues += 1;
                tm_warn!(pipe, stream, row, error = %issue, "couldn't parse time, using file timestamp");
            }
            let ts = match check_range(resolution.timestamp()) {
                Ok(ts) => ts,
                Err(issue) => {
                    summary.issues += 1;
                    tm_warn!(pipe, stream, row, error = %issue, "skipped record");
                    continue;
                }
            };

            if !filter.admit(ts) {
                summary.filtered += 1;
                continue;
            }

            let transformed = transform(&record, &time.field);
            for issue in &transformed.issues {
                summary.issues += 1;
                tm_warn!(pipe, stream, row, error = %issue, "dropped malformed field");
            }

            let points = emit(
                stream,
                &transformed.values,
                &transformed.labels,
                ts,
                &self.config.default_label,
            );
            if points.is_empty() {
                summary.skipped_empty += 1;
                tm_debug!(pipe, stream, row, "skipped metrics due to empty values");
                continue;
            }
            for point in &points {
                self.sink.write_point(point).map_err(|e| {
                    StructError::from(RuntimeReason::Core(CoreReason::Sink))
                        .with_detail(format!("write failed for stream {stream}: {e}"))
                })?;
            }
            summary.points += points.len();
        }

        self.sink.flush().map_err(|e| {
            StructError::from(RuntimeReason::Core(CoreReason::Sink))
                .with_detail(format!("flush failed for stream {stream}: {e}"))
        })?;

        summary.kept = filter.kept();
        if let Some(max) = filter.max_kept()
            && working.advance(stream, max)
        {
            summary.watermark = Some(max);
            tm_debug!(pipe, stream, watermark = %max, "watermark advanced");
        }
        Ok(summary)
    }
}

/// Read `path` as a JSON array of flat objects.
fn read_rows(path: &Path) -> RuntimeResult<Vec<Map<String, Value>>> {
    let bytes = std::fs::read(path).map_err(|e| {
        StructError::from(RuntimeReason::Core(CoreReason::InputFile))
            .with_detail(format!("failed to open {}: {e}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        StructError::from(RuntimeReason::Core(CoreReason::InputFile)).with_detail(format!(
            "{} is not a JSON array of objects: {e}",
            path.display()
        ))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
