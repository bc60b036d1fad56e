use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::MetricSink;
use crate::{EpochRecord, RunSummary, SinkErr};

/// Appends one JSON object per epoch to a file, with the flat tracking
/// keys, and the run summary as the last line.
#[derive(Debug)]
pub struct JsonLinesSink {
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    /// Creates the file at `path`, truncating it if it exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkErr> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl MetricSink for JsonLinesSink {
    fn name(&self) -> &str {
        "json_lines"
    }

    fn publish(&mut self, record: &EpochRecord) -> Result<(), SinkErr> {
        serde_json::to_writer(&mut self.writer, &record.to_flat())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), SinkErr> {
        serde_json::to_writer(&mut self.writer, &serde_json::json!({ "summary": summary }))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
