use log::{debug, info};

use super::MetricSink;
use crate::{EpochRecord, RunSummary, SinkErr};

/// Writes records through the `log` facade as structured fields.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl MetricSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn publish(&mut self, record: &EpochRecord) -> Result<(), SinkErr> {
        info!(
            epoch = record.epoch,
            lr = record.learning_rate,
            train_time = record.train.elapsed,
            eval_time = record.eval.elapsed,
            val_loss = record.val_loss().unwrap_or(f64::NAN);
            "epoch finished"
        );

        for (key, value) in record.to_flat().iter() {
            debug!(epoch = record.epoch, key = key, value = value; "epoch metric");
        }

        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), SinkErr> {
        info!(
            epochs = summary.epochs_run,
            params = summary.trainable_params;
            "run finished: {}",
            summary.state
        );

        if let Some(best) = &summary.best {
            info!(epoch = best.epoch, val_loss = best.val_loss; "best epoch");
        }

        info!(
            "avg training time (s): {:.4} +/- {:.4}",
            summary.train_time.mean, summary.train_time.std
        );
        info!(
            "avg inference time (s): {:.4} +/- {:.4}",
            summary.eval_time.mean, summary.eval_time.std
        );

        Ok(())
    }
}
