use std::time::Duration;

use machine_learning::training::Metrics;
use serde::Serialize;

/// The metrics of one collaborator call and how long it took.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub metrics: Metrics,
    pub elapsed: f64,
}

impl StepReport {
    pub fn new(metrics: Metrics, elapsed: Duration) -> Self {
        Self {
            metrics,
            elapsed: elapsed.as_secs_f64(),
        }
    }
}

/// Everything a single epoch produced. Epochs are numbered from zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub learning_rate: f32,
    pub train: StepReport,
    pub eval: StepReport,
}

impl EpochRecord {
    pub fn val_loss(&self) -> Option<f64> {
        self.eval.metrics.get("val_loss")
    }

    /// Flattens the record into the tracking key layout, e.g.
    /// `epoch-train-train_loss` or `epoch-eval-val_loss`.
    pub fn to_flat(&self) -> Metrics {
        let mut flat = Metrics::new()
            .with("epoch", self.epoch as f64)
            .with("epoch-lr", self.learning_rate as f64)
            .with("epoch-training-train_time", self.train.elapsed)
            .with("epoch-eval-inf_time", self.eval.elapsed);

        for (k, v) in self.train.metrics.iter() {
            flat.insert(format!("epoch-train-train_{k}"), v);
        }

        for (k, v) in self.eval.metrics.iter() {
            flat.insert(format!("epoch-eval-{k}"), v);
        }

        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_keys_follow_the_tracking_layout() {
        let record = EpochRecord {
            epoch: 3,
            learning_rate: 0.5,
            train: StepReport::new(Metrics::new().with("loss", 0.7), Duration::from_millis(1500)),
            eval: StepReport::new(
                Metrics::new().with("val_loss", 0.8).with("val_acc", 0.6),
                Duration::from_millis(250),
            ),
        };

        let flat = record.to_flat();
        assert_eq!(flat.get("epoch"), Some(3.0));
        assert_eq!(flat.get("epoch-lr"), Some(0.5));
        assert_eq!(flat.get("epoch-training-train_time"), Some(1.5));
        assert_eq!(flat.get("epoch-eval-inf_time"), Some(0.25));
        assert_eq!(flat.get("epoch-train-train_loss"), Some(0.7));
        assert_eq!(flat.get("epoch-eval-val_loss"), Some(0.8));
        assert_eq!(flat.get("epoch-eval-val_acc"), Some(0.6));
        assert_eq!(record.val_loss(), Some(0.8));
    }
}
