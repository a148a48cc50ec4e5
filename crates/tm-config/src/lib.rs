pub mod ingest;
pub mod logging;
pub mod sink;
pub mod time;
pub mod types;
mod validate;

pub use ingest::IngestConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use sink::{SinkUri, parse_sink_uri};
pub use time::TimeConfig;
pub use types::TimeFormat;
