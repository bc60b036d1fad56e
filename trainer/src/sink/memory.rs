use std::sync::{Arc, Mutex, PoisonError};

use super::MetricSink;
use crate::{EpochRecord, RunSummary, SinkErr};

#[derive(Debug, Default)]
struct Buffer {
    records: Vec<EpochRecord>,
    summary: Option<RunSummary>,
}

/// Keeps every record in memory. Clones share the same buffer, so a clone
/// can be handed to a controller and read back afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Buffer>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<EpochRecord> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary
            .clone()
    }
}

impl MetricSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn publish(&mut self, record: &EpochRecord) -> Result<(), SinkErr> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .push(record.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), SinkErr> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary = Some(summary.clone());
        Ok(())
    }
}
