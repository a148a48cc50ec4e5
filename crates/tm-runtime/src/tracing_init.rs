use std::fmt::{self as stdfmt, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use tm_config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Span field formatter for the log file layer.
///
/// Formatted span fields are cached per formatter type; a distinct type keeps
/// the file layer (no ANSI) from reusing the stderr layer's cache.
#[derive(Default)]
pub struct FileFields(DefaultFields);

impl<'w> FormatFields<'w> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: Writer<'w>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat: plain-text events with a `[domain]` prefix
// ---------------------------------------------------------------------------

/// Renders
///
/// ```text
/// 2026-02-21T01:17:14Z  INFO [pipe] ingest.run{files=1}: wrote metrics stream="cpu" rows=12 filtered=0 points=12
/// ```
///
/// The `domain` field injected by the `tm_*!` macros becomes the prefix
/// instead of a trailing `domain=..` pair.
#[derive(Default)]
pub struct DomainFormat {
    timer: SystemTime,
}

impl DomainFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

/// ANSI SGR code used for `level` when colours are on.
fn level_style(level: Level) -> &'static str {
    match level {
        Level::ERROR => "31",
        Level::WARN => "33",
        Level::INFO => "32",
        Level::DEBUG => "34",
        Level::TRACE => "35",
    }
}

/// Write `text` wrapped in an SGR sequence when `ansi` is set.
fn styled(w: &mut Writer<'_>, ansi: bool, style: &str, text: impl stdfmt::Display) -> stdfmt::Result {
    if ansi {
        write!(w, "\x1b[{style}m{text}\x1b[0m")
    } else {
        write!(w, "{text}")
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'w> FormatFields<'w> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = w.has_ansi_escapes();
        let level = *event.metadata().level();

        let mut stamp = String::new();
        if self.timer.format_time(&mut Writer::new(&mut stamp)).is_err() {
            stamp.push_str("<unknown time>");
        }
        styled(&mut w, ansi, "2", stamp)?;
        w.write_char(' ')?;
        styled(&mut w, ansi, level_style(level), format_args!("{level:>5}"))?;
        w.write_char(' ')?;

        let mut fields = EventFields::default();
        event.record(&mut fields);
        if let Some(domain) = &fields.domain {
            styled(&mut w, ansi, "1;36", format_args!("[{domain}]"))?;
            w.write_char(' ')?;
        }

        for span in ctx.event_scope().into_iter().flat_map(|scope| scope.from_root()) {
            let extensions = span.extensions();
            let span_fields = extensions
                .get::<FormattedFields<N>>()
                .map(|f| f.as_str())
                .unwrap_or_default();
            write!(w, "{}{{{span_fields}}}: ", span.name())?;
        }

        w.write_str(&fields.message)?;
        for (name, value) in &fields.rest {
            write!(w, " {name}={value}")?;
        }
        writeln!(w)
    }
}

/// Event fields split into the domain tag, the message and everything else
/// in recording order.
#[derive(Default)]
struct EventFields {
    domain: Option<String>,
    message: String,
    rest: Vec<(&'static str, String)>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.rest.push((name, format!("{value:?}"))),
        }
    }

    // Every other primitive lands here through `Visit`'s default methods.
    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => self.domain = Some(format!("{value:?}").trim_matches('"').to_string()),
            "message" => self.message = format!("{value:?}"),
            name => self.rest.push((name, format!("{value:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

fn env_filter(config: &LoggingConfig, verbose: bool) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(EnvFilter::from_default_env());
    }
    let directives = config.directives(verbose);
    EnvFilter::try_new(&directives).with_context(|| format!("invalid log filter '{directives}'"))
}

fn stderr_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    let layer = fmt::layer().with_writer(std::io::stderr);
    match format {
        LogFormat::Json => layer.json().with_target(false).with_filter(filter).boxed(),
        LogFormat::Plain => layer.event_format(DomainFormat::new()).with_filter(filter).boxed(),
    }
}

fn file_layer(path: &Path, format: LogFormat, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard)> {
    let (dir, name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => anyhow::bail!("log file path {} needs a directory and a file name", path.display()),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    let layer = fmt::layer()
        .fmt_fields(FileFields::default())
        .with_ansi(false)
        .with_writer(writer);
    let layer = match format {
        LogFormat::Json => layer.json().with_target(false).with_filter(filter).boxed(),
        LogFormat::Plain => layer.event_format(DomainFormat::new()).with_filter(filter).boxed(),
    };
    Ok((layer, guard))
}

/// Install the global subscriber described by `config`.
///
/// Logs always go to stderr, since stdout may carry line protocol. When
/// `logging.file` is set (relative to `base_dir`) events are also written
/// there through a non-blocking writer; the returned guard must be held
/// until exit so buffered lines are flushed. `RUST_LOG`, when set, replaces
/// the configured filter entirely.
pub fn init_tracing(
    config: &LoggingConfig,
    base_dir: &Path,
    verbose: bool,
) -> Result<Option<WorkerGuard>> {
    let mut layers = vec![stderr_layer(config.format, env_filter(config, verbose)?)];
    let guard = match config.file_path(base_dir) {
        Some(path) => {
            let (layer, guard) = file_layer(&path, config.format, env_filter(config, verbose)?)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(guard)
}
