use crate::config::{EarlyStopConfig, EarlyStopMode};

/// Stops a run once the monitored loss got worse `patience` epochs in a row.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    config: EarlyStopConfig,
    reference: f64,
    triggers: usize,
}

impl EarlyStopping {
    pub fn new(config: EarlyStopConfig) -> Self {
        Self {
            config,
            reference: f64::INFINITY,
            triggers: 0,
        }
    }

    /// Feeds one epoch's loss.
    ///
    /// A loss above the reference (or NaN) counts as a trigger, anything else
    /// resets the counter.
    ///
    /// # Returns
    /// Whether the run should stop.
    pub fn step(&mut self, loss: f64) -> bool {
        let worse = loss.is_nan() || loss > self.reference;

        if worse {
            self.triggers += 1;
        } else {
            self.triggers = 0;
        }

        match self.config.mode() {
            EarlyStopMode::Best if !worse => self.reference = loss,
            EarlyStopMode::Previous if !loss.is_nan() => self.reference = loss,
            _ => {}
        }

        self.triggers >= self.config.patience()
    }

    pub fn triggers(&self) -> usize {
        self.triggers
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn policy(patience: usize, mode: EarlyStopMode) -> EarlyStopping {
        let patience = NonZeroUsize::new(patience).unwrap();
        EarlyStopping::new(EarlyStopConfig::new(patience, mode))
    }

    fn stop_index(policy: &mut EarlyStopping, losses: &[f64]) -> Option<usize> {
        losses.iter().position(|&l| policy.step(l))
    }

    #[test]
    fn equal_loss_is_not_a_trigger() {
        let mut p = policy(1, EarlyStopMode::Best);
        assert!(!p.step(1.0));
        assert!(!p.step(1.0));
    }

    #[test]
    fn best_mode_compares_against_the_lowest_loss() {
        // 0.7 improves on the previous epoch but not on the best 0.5.
        let losses = [0.5, 0.9, 0.7, 0.8];
        assert_eq!(stop_index(&mut policy(3, EarlyStopMode::Best), &losses), Some(3));
    }

    #[test]
    fn previous_mode_compares_against_the_last_loss() {
        let losses = [0.5, 0.9, 0.7, 0.8];
        let mut p = policy(3, EarlyStopMode::Previous);

        assert_eq!(stop_index(&mut p, &losses), None);
        assert_eq!(p.triggers(), 1);
        assert_eq!(p.reference(), 0.8);
    }

    #[test]
    fn nan_counts_as_a_trigger() {
        let mut p = policy(2, EarlyStopMode::Best);
        p.step(1.0);

        assert!(!p.step(f64::NAN));
        assert!(p.step(f64::NAN));
        assert_eq!(p.reference(), 1.0);
    }
}
