#[macro_use]
mod log_macros;

pub mod error;
pub mod ingest;
pub mod sink_build;
pub mod summary;
pub mod tracing_init;

pub use ingest::Ingestor;
pub use sink_build::build_point_sink;
pub use summary::{FileSummary, RunSummary};
