//! Destinations for epoch records. A sink failing never stops a run.

mod json_lines;
mod log_sink;
mod memory;

pub use json_lines::JsonLinesSink;
pub use log_sink::LogSink;
pub use memory::MemorySink;

use crate::{EpochRecord, RunSummary, SinkErr};

/// An append only consumer of epoch records.
pub trait MetricSink {
    fn name(&self) -> &str;

    /// Consumes the record of a finished epoch.
    fn publish(&mut self, record: &EpochRecord) -> Result<(), SinkErr>;

    /// Consumes the summary once the run reached a terminal state.
    fn finish(&mut self, _summary: &RunSummary) -> Result<(), SinkErr> {
        Ok(())
    }
}
