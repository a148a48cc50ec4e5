use chrono::{DateTime, Utc};

/// Whether a record at `ts` is new relative to `baseline`.
///
/// Equality counts as already seen; a stream without a baseline keeps
/// everything.
pub fn should_keep(ts: DateTime<Utc>, baseline: Option<DateTime<Utc>>) -> bool {
    baseline.is_none_or(|b| ts > b)
}

pub fn update_max(current: Option<DateTime<Utc>>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    current.map_or(candidate, |c| c.max(candidate))
}

/// Per-file filter state: the baseline to compare against and the running
/// maximum over kept records.
#[derive(Debug, Clone)]
pub struct WatermarkFilter {
    baseline: Option<DateTime<Utc>>,
    max_kept: Option<DateTime<Utc>>,
    kept: usize,
    dropped: usize,
}

impl WatermarkFilter {
    pub fn new(baseline: Option<DateTime<Utc>>) -> Self {
        Self {
            baseline,
            max_kept: None,
            kept: 0,
            dropped: 0,
        }
    }

    /// Decide on one record and fold its timestamp into the maximum if kept.
    pub fn admit(&mut self, ts: DateTime<Utc>) -> bool {
        if should_keep(ts, self.baseline) {
            self.max_kept = Some(update_max(self.max_kept, ts));
            self.kept += 1;
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    pub fn baseline(&self) -> Option<DateTime<Utc>> {
        self.baseline
    }

    /// Largest timestamp among kept records, `None` if nothing was kept.
    pub fn max_kept(&self) -> Option<DateTime<Utc>> {
        self.max_kept
    }

    pub fn kept(&self) -> usize {
        self.kept
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
