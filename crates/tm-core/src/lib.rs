//! Incremental ingestion engine: watermark store, stream identification,
//! time resolution, row transformation, watermark filtering and point
//! emission.

pub mod error;
pub mod filter;
pub mod point;
pub mod position;
pub mod record;
pub mod sink;
pub mod stream;
pub mod time;
pub mod transform;

pub use filter::{WatermarkFilter, should_keep, update_max};
pub use point::{Point, emit};
pub use position::{PositionStore, Positions};
pub use record::{FieldValue, Record, RecordIssue};
pub use stream::{FilenameError, StreamDescriptor, identify, to_snake_case};
pub use time::{Resolution, check_range, resolve};
pub use transform::{Transformed, transform};
