use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;

use super::{PointSink, line_protocol};
use crate::point::Point;

/// Writes points as InfluxDB line protocol, one per line.
pub struct LineProtocolSink {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
}

impl LineProtocolSink {
    /// Append to the file at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn stdout() -> Self {
        Self::from_writer(Box::new(io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
        }
    }
}

impl PointSink for LineProtocolSink {
    fn write_point(&self, point: &Point) -> Result<()> {
        let line = line_protocol::encode(point)?;
        let mut w = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("line protocol sink lock poisoned"))?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut w = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("line protocol sink lock poisoned"))?;
        w.flush()?;
        Ok(())
    }
}
