use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// `[logging]` section of `tidemark.toml`.
///
/// ```toml
/// [logging]
/// level = "warn"
/// format = "json"
/// file = "logs/tidemark.log"
///
/// [logging.modules]
/// tm_runtime = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Target → level, applied after `level`.
    pub modules: BTreeMap<String, String>,
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: BTreeMap::new(),
            file: None,
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directives: the global level, then one `target=level`
    /// per module in target order. `verbose` forces the global level to
    /// `debug` but leaves module overrides alone.
    pub fn directives(&self, verbose: bool) -> String {
        let global = if verbose { "debug" } else { self.level.as_str() };
        std::iter::once(global.to_string())
            .chain(
                self.modules
                    .iter()
                    .map(|(target, level)| format!("{target}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Log file location with relative paths anchored at `base_dir`.
    pub fn file_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.file.as_ref().map(|file| {
            if file.is_relative() {
                base_dir.join(file)
            } else {
                file.clone()
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[domain]`-prefixed human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_list_modules_in_order() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            modules: BTreeMap::from([
                ("tm_runtime".to_string(), "debug".to_string()),
                ("tm_core".to_string(), "info".to_string()),
            ]),
            ..LoggingConfig::default()
        };
        assert_eq!(config.directives(false), "warn,tm_core=info,tm_runtime=debug");
        assert_eq!(config.directives(true), "debug,tm_core=info,tm_runtime=debug");
    }

    #[test]
    fn default_directives() {
        assert_eq!(LoggingConfig::default().directives(false), "info");
        assert_eq!(LoggingConfig::default().directives(true), "debug");
    }

    #[test]
    fn file_path_is_anchored_at_base_dir() {
        let base = Path::new("/etc/tidemark");
        let mut config = LoggingConfig::default();
        assert_eq!(config.file_path(base), None);

        config.file = Some(PathBuf::from("logs/run.log"));
        assert_eq!(
            config.file_path(base),
            Some(PathBuf::from("/etc/tidemark/logs/run.log"))
        );

        config.file = Some(PathBuf::from("/var/log/tidemark.log"));
        assert_eq!(
            config.file_path(base),
            Some(PathBuf::from("/var/log/tidemark.log"))
        );
    }

    #[test]
    fn parses_table() {
        let config: LoggingConfig = toml::from_str(
            r#"
level = "debug"
format = "json"

[modules]
tm_core = "trace"
"#,
        )
        .unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.modules["tm_core"], "trace");
        assert_eq!(config.file, None);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(toml::from_str::<LoggingConfig>("colour = true").is_err());
    }
}
