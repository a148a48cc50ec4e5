use chrono::{DateTime, Utc};

/// Counters for one ingested file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSummary {
    pub stream: String,
    /// Rows read from the JSON array.
    pub rows: usize,
    /// Rows at or before the stream's baseline watermark.
    pub filtered: usize,
    /// Rows newer than the baseline.
    pub kept: usize,
    /// Points handed to the sink.
    pub points: usize,
    /// Kept rows that carried no numeric values.
    pub skipped_empty: usize,
    /// Non-fatal record issues (unparseable time, malformed composite field).
    pub issues: usize,
    /// New watermark, when this file advanced the stream.
    pub watermark: Option<DateTime<Utc>>,
}

impl FileSummary {
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub files: Vec<FileSummary>,
}

impl RunSummary {
    pub fn points(&self) -> usize {
        self.files.iter().map(|f| f.points).sum()
    }

    pub fn rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }

    pub fn issues(&self) -> usize {
        self.files.iter().map(|f| f.issues).sum()
    }
}
