use machine_learning::training::Metrics;
use serde::Serialize;

use crate::{EpochRecord, RunState, timing::TimeStats};

/// The epoch with the lowest validation loss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestEpoch {
    pub epoch: usize,
    pub val_loss: f64,
    pub eval: Metrics,
}

/// What a finished run reports once, after its last epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub state: RunState,
    pub epochs_run: usize,
    pub trainable_params: usize,
    pub best: Option<BestEpoch>,
    pub train_time: TimeStats,
    pub eval_time: TimeStats,
}

impl RunSummary {
    /// Summarizes the records of a run.
    ///
    /// # Arguments
    /// * `state` - The state the run ended in.
    /// * `trainable_params` - The size of the trained model.
    /// * `records` - Every epoch record, in order.
    pub fn from_records(state: RunState, trainable_params: usize, records: &[EpochRecord]) -> Self {
        let best = records
            .iter()
            .filter_map(|r| r.val_loss().filter(|l| !l.is_nan()).map(|l| (r, l)))
            .fold(None::<(&EpochRecord, f64)>, |best, (r, l)| match best {
                Some((_, b)) if b <= l => best,
                _ => Some((r, l)),
            })
            .map(|(r, val_loss)| BestEpoch {
                epoch: r.epoch,
                val_loss,
                eval: r.eval.metrics.clone(),
            });

        let train: Vec<f64> = records.iter().map(|r| r.train.elapsed).collect();
        let eval: Vec<f64> = records.iter().map(|r| r.eval.elapsed).collect();

        Self {
            state,
            epochs_run: records.len(),
            trainable_params,
            best,
            train_time: TimeStats::from_samples(&train),
            eval_time: TimeStats::from_samples(&eval),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::StepReport;

    fn record(epoch: usize, val_loss: f64, secs: u64) -> EpochRecord {
        EpochRecord {
            epoch,
            learning_rate: 0.1,
            train: StepReport::new(Metrics::new(), Duration::from_secs(secs)),
            eval: StepReport::new(Metrics::new().with("val_loss", val_loss), Duration::from_secs(1)),
        }
    }

    #[test]
    fn first_lowest_val_loss_is_the_best_epoch() {
        let records = [record(0, 0.9, 1), record(1, 0.4, 3), record(2, 0.4, 1), record(3, f64::NAN, 1)];
        let summary = RunSummary::from_records(RunState::StoppedBudget, 10, &records);

        let best = summary.best.unwrap();
        assert_eq!(best.epoch, 1);
        assert_eq!(best.val_loss, 0.4);
        assert_eq!(summary.epochs_run, 4);
        assert_eq!(summary.train_time.mean, 1.5);
        assert_eq!(summary.eval_time.std, 0.0);
    }

    #[test]
    fn empty_run_has_no_best_epoch() {
        let summary = RunSummary::from_records(RunState::StoppedError, 0, &[]);
        assert!(summary.best.is_none());
        assert_eq!(summary.epochs_run, 0);
    }
}
