use std::fmt;
use std::path::{Path, PathBuf};

/// Parsed point sink destination.
///
/// Accepted forms:
/// - `"stdout"`
/// - `"file://points.lp"` (relative to the config directory)
/// - `"file:///var/lib/tidemark/points.lp"` (absolute)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkUri {
    Stdout,
    File { path: PathBuf },
}

impl SinkUri {
    /// Resolve a relative file path against `base_dir`. Stdout is unchanged.
    pub fn resolve(&self, base_dir: &Path) -> SinkUri {
        match self {
            SinkUri::Stdout => SinkUri::Stdout,
            SinkUri::File { path } if path.is_relative() => SinkUri::File {
                path: base_dir.join(path),
            },
            SinkUri::File { path } => SinkUri::File { path: path.clone() },
        }
    }
}

impl fmt::Display for SinkUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkUri::Stdout => write!(f, "stdout"),
            SinkUri::File { path } => write!(f, "file://{}", path.display()),
        }
    }
}

/// Parse a sink URI string.
pub fn parse_sink_uri(uri: &str) -> anyhow::Result<SinkUri> {
    if uri == "stdout" || uri == "-" {
        return Ok(SinkUri::Stdout);
    }
    let path = uri
        .strip_prefix("file://")
        .ok_or_else(|| anyhow::anyhow!("unsupported sink uri {uri:?} (expected stdout or file://)"))?;
    if path.is_empty() {
        anyhow::bail!("sink uri {uri:?} has an empty path");
    }
    Ok(SinkUri::File {
        path: PathBuf::from(path),
    })
}
