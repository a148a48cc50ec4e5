use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use orion_error::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CoreReason, CoreResult};

// ---------------------------------------------------------------------------
// Positions: stream → watermark mapping
// ---------------------------------------------------------------------------

/// Latest ingested timestamp per stream.
///
/// Each [`PositionStore::load`] returns a fresh, independently owned value;
/// mutating one copy never affects another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positions {
    #[serde(default)]
    positions: BTreeMap<String, DateTime<Utc>>,
}

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watermark for `stream`, or `None` if the stream was never ingested.
    pub fn get(&self, stream: &str) -> Option<DateTime<Utc>> {
        self.positions.get(stream).copied()
    }

    /// Move the watermark of `stream` forward to `candidate`.
    ///
    /// The value is only written when it is strictly greater than the
    /// current one (or the stream is unknown). Returns whether it moved.
    pub fn advance(&mut self, stream: &str, candidate: DateTime<Utc>) -> bool {
        match self.positions.get_mut(stream) {
            Some(current) if *current >= candidate => false,
            Some(current) => {
                *current = candidate;
                true
            }
            None => {
                self.positions.insert(stream.to_string(), candidate);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ---------------------------------------------------------------------------
// PositionStore: TOML persistence
// ---------------------------------------------------------------------------

/// File-backed watermark store.
///
/// ```toml
/// [positions]
/// cpu = "2024-01-15T12:00:00Z"
/// http_status = "2024-01-16T00:00:00Z"
/// ```
#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted positions. A missing file yields an empty mapping.
    pub fn load(&self) -> CoreResult<Positions> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Positions::new()),
            Err(e) => {
                return Err(StructError::from(CoreReason::StoreUnavailable)
                    .with_detail(format!("failed to read {}: {e}", self.path.display())));
            }
        };
        toml::from_str(&content).map_err(|e| {
            StructError::from(CoreReason::StoreUnavailable)
                .with_detail(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    /// Replace the persisted positions with `positions`.
    ///
    /// The document is written to a sibling temp file first and renamed over
    /// the target, so readers never observe a half-written store.
    pub fn save(&self, positions: &Positions) -> CoreResult<()> {
        let content = toml::to_string_pretty(positions).map_err(|e| {
            StructError::from(CoreReason::StoreUnavailable)
                .with_detail(format!("failed to encode positions: {e}"))
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StructError::from(CoreReason::StoreUnavailable)
                    .with_detail(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, content).map_err(|e| {
            StructError::from(CoreReason::StoreUnavailable)
                .with_detail(format!("failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            StructError::from(CoreReason::StoreUnavailable)
                .with_detail(format!("failed to replace {}: {e}", self.path.display()))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("positions.toml"));
        let positions = store.load().unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("state/positions.toml"));

        let mut positions = Positions::new();
        positions.advance("cpu", ts(12, 0, 0));
        positions.advance("http_status", ts(13, 30, 5));
        store.save(&positions).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, positions);
        assert_eq!(loaded.get("cpu"), Some(ts(12, 0, 0)));
        assert!(!dir.path().join("state/positions.toml.tmp").exists());
    }

    #[test]
    fn persisted_form_is_rfc3339() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.toml");
        let store = PositionStore::new(&path);

        let mut positions = Positions::new();
        positions.advance("cpu", ts(12, 0, 0));
        store.save(&positions).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[positions]"), "{text}");
        assert!(text.contains("cpu = \"2024-01-15T12:00:00Z\""), "{text}");
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("positions.toml"));

        let mut first = Positions::new();
        first.advance("cpu", ts(1, 0, 0));
        first.advance("mem", ts(1, 0, 0));
        store.save(&first).unwrap();

        let mut second = Positions::new();
        second.advance("cpu", ts(2, 0, 0));
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("mem"), None);
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.toml");
        std::fs::write(&path, "[positions]\ncpu = \"yesterday\"\n").unwrap();
        assert!(PositionStore::new(&path).load().is_err());
    }

    #[test]
    fn unreadable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(PositionStore::new(dir.path()).load().is_err());
    }

    #[test]
    fn two_loads_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("positions.toml"));
        let mut seed = Positions::new();
        seed.advance("cpu", ts(12, 0, 0));
        store.save(&seed).unwrap();

        let baseline = store.load().unwrap();
        let mut working = store.load().unwrap();
        working.advance("cpu", ts(18, 0, 0));
        working.advance("mem", ts(18, 0, 0));

        assert_eq!(baseline.get("cpu"), Some(ts(12, 0, 0)));
        assert_eq!(baseline.get("mem"), None);
        assert_eq!(working.get("cpu"), Some(ts(18, 0, 0)));
    }

    #[test]
    fn advance_never_regresses() {
        let mut positions = Positions::new();
        assert!(positions.advance("cpu", ts(12, 0, 0)));
        assert!(!positions.advance("cpu", ts(11, 0, 0)));
        assert!(!positions.advance("cpu", ts(12, 0, 0)));
        assert_eq!(positions.get("cpu"), Some(ts(12, 0, 0)));
        assert!(positions.advance("cpu", ts(12, 0, 1)));
        assert_eq!(positions.get("cpu"), Some(ts(12, 0, 1)));
    }
}
