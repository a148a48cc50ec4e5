use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;

use tm_config::{IngestConfig, TimeFormat};
use tm_core::PositionStore;
use tm_runtime::tracing_init::init_tracing;
use tm_runtime::{Ingestor, build_point_sink};

#[derive(Parser)]
#[command(name = "tidemark", about = "Incremental JSON to time-series ingestion")]
struct Cli {
    /// Path to tidemark.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record field holding the timestamp
    #[arg(long, value_name = "NAME")]
    time_field: Option<String>,

    /// Time format to try (repeatable; replaces the configured list)
    #[arg(long, value_name = "FMT", value_parser = parse_time_format)]
    time_format: Vec<TimeFormat>,

    /// Positions (watermark) file
    #[arg(long, value_name = "PATH")]
    positions_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// JSON input files, processed in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn parse_time_format(s: &str) -> Result<TimeFormat, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn main() -> Result<()> {
    let run_started = Utc::now();
    let cli = Cli::parse();

    let (mut config, base_dir) = match &cli.config {
        Some(path) => {
            let config_path = path
                .canonicalize()
                .map_err(|e| anyhow::anyhow!("config path '{}': {e}", path.display()))?;
            let config = IngestConfig::load(&config_path)?;
            let base_dir = config_path
                .parent()
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("config path has no parent directory"))?;
            (config, base_dir)
        }
        None => (IngestConfig::default(), std::env::current_dir()?),
    };

    if let Some(field) = cli.time_field {
        config.time.field = field;
    }
    if !cli.time_format.is_empty() {
        config.time.formats = cli.time_format;
    }
    if let Some(path) = cli.positions_file {
        config.positions_file = path;
    }
    config.validate()?;

    let _guard = init_tracing(&config.logging, &base_dir, cli.debug)?;
    tracing::debug!(
        domain = "conf",
        base_dir = %base_dir.display(),
        time_field = %config.time.field,
        sinks = config.sinks.len(),
        "configuration resolved"
    );

    let sink = build_point_sink(&config, &base_dir).map_err(|e| anyhow::anyhow!("{e}"))?;
    let store = PositionStore::new(config.positions_path(&base_dir));
    Ingestor::new(config, store, sink, run_started)
        .run(&cli.files)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(())
}
