use crate::config::PlateauConfig;

const MIN_LR_DELTA: f32 = 1e-8;

/// Reduces the learning rate when the monitored loss stops improving.
#[derive(Debug, Clone)]
pub struct PlateauScheduler {
    config: PlateauConfig,
    best: f64,
    bad_epochs: usize,
}

impl PlateauScheduler {
    pub fn new(config: PlateauConfig) -> Self {
        Self {
            config,
            best: f64::INFINITY,
            bad_epochs: 0,
        }
    }

    /// Feeds one epoch's loss.
    ///
    /// # Arguments
    /// * `loss` - The monitored loss, lower is better.
    /// * `lr` - The learning rate in effect during the epoch.
    ///
    /// # Returns
    /// The reduced learning rate when a reduction fires, `None` otherwise.
    pub fn step(&mut self, loss: f64, lr: f32) -> Option<f32> {
        if loss < self.best * (1.0 - self.config.threshold()) {
            self.best = loss;
            self.bad_epochs = 0;
            return None;
        }

        self.bad_epochs += 1;
        if self.bad_epochs < self.config.patience() {
            return None;
        }

        self.bad_epochs = 0;
        let new_lr = (lr * self.config.factor()).max(self.config.min_lr());
        (lr - new_lr > MIN_LR_DELTA).then_some(new_lr)
    }

    pub fn bad_epochs(&self) -> usize {
        self.bad_epochs
    }

    pub fn best(&self) -> f64 {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn scheduler(patience: usize, min_lr: f32) -> PlateauScheduler {
        let patience = NonZeroUsize::new(patience).unwrap();
        PlateauScheduler::new(PlateauConfig::new(0.1, patience, min_lr, 1e-4).unwrap())
    }

    #[test]
    fn plateau_of_exactly_patience_epochs_reduces_once() {
        let mut s = scheduler(3, 1e-6);

        assert_eq!(s.step(1.0, 0.1), None);
        assert_eq!(s.step(1.0, 0.1), None);
        assert_eq!(s.step(1.0, 0.1), None);

        let reduced = s.step(1.0, 0.1).unwrap();
        assert!((reduced - 0.01).abs() < 1e-9);
        assert_eq!(s.bad_epochs(), 0);
    }

    #[test]
    fn improvement_resets_the_counter() {
        let mut s = scheduler(2, 0.0);

        s.step(1.0, 0.1);
        assert_eq!(s.step(1.0, 0.1), None);
        assert_eq!(s.step(0.5, 0.1), None);
        assert_eq!(s.bad_epochs(), 0);
        assert_eq!(s.step(0.6, 0.1), None);
        assert!(s.step(0.6, 0.1).is_some());
    }

    #[test]
    fn tiny_relative_gains_are_not_improvements() {
        let mut s = scheduler(1, 0.0);

        s.step(1.0, 0.1);
        assert!(s.step(0.99999, 0.1).is_some());
    }

    #[test]
    fn learning_rate_never_drops_below_the_minimum() {
        let mut s = scheduler(1, 0.05);
        s.step(1.0, 0.1);

        let lr = s.step(1.0, 0.1).unwrap();
        assert_eq!(lr, 0.05);
        assert_eq!(s.step(1.0, lr), None);
    }

    #[test]
    fn nan_never_improves() {
        let mut s = scheduler(1, 0.0);
        s.step(1.0, 0.1);

        assert!(s.step(f64::NAN, 0.1).is_some());
        assert_eq!(s.best(), 1.0);
    }
}
