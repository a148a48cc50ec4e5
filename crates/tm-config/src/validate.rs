use crate::ingest::IngestConfig;

/// Internal validation, called automatically during `IngestConfig::from_str` / `load`.
pub(crate) fn validate(config: &IngestConfig) -> anyhow::Result<()> {
    if config.time.field.trim().is_empty() {
        anyhow::bail!("time.field must not be empty");
    }

    if config.time.formats.is_empty() {
        anyhow::bail!("time.formats must contain at least one format");
    }

    if config.positions_file.as_os_str().is_empty() {
        anyhow::bail!("positions_file must not be empty");
    }

    // default_label: stream → label, both non-empty and free of whitespace
    for (stream, label) in &config.default_label {
        if !is_valid_name(stream) {
            anyhow::bail!("default_label: invalid stream name {stream:?}");
        }
        if !is_valid_name(label) {
            anyhow::bail!("default_label.{stream}: invalid label name {label:?}");
        }
    }

    if config.sinks.is_empty() {
        anyhow::bail!("sinks must contain at least one sink URI");
    }

    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
