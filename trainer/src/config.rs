use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{Result, TrainErr};

/// Which loss the early stopping policy compares the current one against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyStopMode {
    /// The lowest loss seen so far.
    #[default]
    Best,
    /// The loss of the previous epoch.
    Previous,
}

/// Plateau learning rate reduction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateauConfig {
    factor: f32,
    patience: NonZeroUsize,
    min_lr: f32,
    threshold: f64,
}

impl PlateauConfig {
    /// Creates a new plateau configuration.
    ///
    /// # Arguments
    /// * `factor` - The multiplier applied to the learning rate, in `(0, 1)`.
    /// * `patience` - Epochs without improvement before a reduction.
    /// * `min_lr` - The lower bound of the learning rate.
    /// * `threshold` - The relative improvement a loss needs to count as better.
    ///
    /// # Returns
    /// The configuration or `TrainErr::Config` if a value is out of range.
    pub fn new(factor: f32, patience: NonZeroUsize, min_lr: f32, threshold: f64) -> Result<Self> {
        if !(factor > 0.0 && factor < 1.0) {
            return Err(TrainErr::Config(format!(
                "lr reduction factor must be in (0, 1), got {factor}"
            )));
        }

        if !(min_lr >= 0.0 && min_lr.is_finite()) {
            return Err(TrainErr::Config(format!(
                "min lr must be a finite non negative number, got {min_lr}"
            )));
        }

        if !(threshold >= 0.0 && threshold < 1.0) {
            return Err(TrainErr::Config(format!(
                "lr reduction threshold must be in [0, 1), got {threshold}"
            )));
        }

        Ok(Self {
            factor,
            patience,
            min_lr,
            threshold,
        })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn patience(&self) -> usize {
        self.patience.get()
    }

    pub fn min_lr(&self) -> f32 {
        self.min_lr
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Early stopping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyStopConfig {
    patience: NonZeroUsize,
    mode: EarlyStopMode,
}

impl EarlyStopConfig {
    pub fn new(patience: NonZeroUsize, mode: EarlyStopMode) -> Self {
        Self { patience, mode }
    }

    pub fn patience(&self) -> usize {
        self.patience.get()
    }

    pub fn mode(&self) -> EarlyStopMode {
        self.mode
    }
}

/// Immutable execution bounds for an epoch controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    epochs: NonZeroUsize,
    plateau: PlateauConfig,
    early_stop: EarlyStopConfig,
}

impl ControllerConfig {
    /// Creates a new controller configuration.
    ///
    /// # Arguments
    /// * `epochs` - The epoch budget.
    /// * `plateau` - The learning rate reduction policy parameters.
    /// * `early_stop` - The early stopping policy parameters.
    pub fn new(epochs: NonZeroUsize, plateau: PlateauConfig, early_stop: EarlyStopConfig) -> Self {
        Self {
            epochs,
            plateau,
            early_stop,
        }
    }

    /// Returns the total number of epochs a run may execute.
    pub fn epochs(&self) -> usize {
        self.epochs.get()
    }

    pub fn plateau(&self) -> PlateauConfig {
        self.plateau
    }

    pub fn early_stop(&self) -> EarlyStopConfig {
        self.early_stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn factor_outside_the_unit_interval_is_rejected() {
        for factor in [0.0, 1.0, 1.5, -0.1, f32::NAN] {
            assert!(matches!(
                PlateauConfig::new(factor, nz(5), 1e-6, 1e-4),
                Err(TrainErr::Config(_))
            ));
        }
    }

    #[test]
    fn negative_min_lr_is_rejected() {
        assert!(PlateauConfig::new(0.1, nz(5), -1.0, 1e-4).is_err());
        assert!(PlateauConfig::new(0.1, nz(5), 0.0, 1e-4).is_ok());
    }

    #[test]
    fn early_stop_mode_defaults_to_best() {
        assert_eq!(EarlyStopMode::default(), EarlyStopMode::Best);
        let mode: EarlyStopMode = serde_json::from_str("\"previous\"").unwrap();
        assert_eq!(mode, EarlyStopMode::Previous);
    }
}
