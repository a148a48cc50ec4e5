use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::logging::LoggingConfig;
use crate::sink::{SinkUri, parse_sink_uri};
use crate::time::TimeConfig;
use crate::validate;

const DEFAULT_POSITIONS_FILE: &str = "positions.toml";

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IngestConfigRaw {
    #[serde(default = "default_positions_file")]
    positions_file: PathBuf,
    #[serde(default = "default_sinks")]
    sinks: Vec<String>,
    #[serde(default)]
    time: TimeConfig,
    /// `stream name → label name` for default-label fan-out.
    #[serde(default)]
    default_label: HashMap<String, String>,
    #[serde(default)]
    logging: LoggingConfig,
}

fn default_positions_file() -> PathBuf {
    PathBuf::from(DEFAULT_POSITIONS_FILE)
}

fn default_sinks() -> Vec<String> {
    vec!["stdout".to_string()]
}

// ---------------------------------------------------------------------------
// IngestConfig (resolved, validated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Positions (watermark) file. Relative paths are resolved against the
    /// config file's parent directory.
    pub positions_file: PathBuf,
    pub sinks: Vec<SinkUri>,
    pub time: TimeConfig,
    pub default_label: HashMap<String, String>,
    pub logging: LoggingConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            positions_file: default_positions_file(),
            sinks: vec![SinkUri::Stdout],
            time: TimeConfig::default(),
            default_label: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Read and parse a `tidemark.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }

    /// Absolute location of the positions file for a given config directory.
    pub fn positions_path(&self, base_dir: &Path) -> PathBuf {
        if self.positions_file.is_relative() {
            base_dir.join(&self.positions_file)
        } else {
            self.positions_file.clone()
        }
    }

    /// Re-check invariants after CLI overrides have been applied.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate::validate(self)
    }
}

impl FromStr for IngestConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a resolved, validated [`IngestConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: IngestConfigRaw = toml::from_str(toml_str)?;

        let sinks = raw
            .sinks
            .iter()
            .map(|uri| parse_sink_uri(uri))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let config = IngestConfig {
            positions_file: raw.positions_file,
            sinks,
            time: raw.time,
            default_label: raw.default_label,
            logging: raw.logging,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
