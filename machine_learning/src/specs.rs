use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        weight_decay: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
        weight_decay: f32,
    },
}

impl OptimizerSpec {
    /// An `Adam` spec with the usual moment hyperparameters.
    pub fn adam(learning_rate: f32, weight_decay: f32) -> Self {
        Self::Adam {
            learning_rate,
            weight_decay,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// The specification for a `SignTrainer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignSpec {
    pub hidden: usize,
    pub k: usize,
    pub dropout: f32,
    pub input_dropout: f32,
    pub batch_size: NonZeroUsize,
    pub eval_batch_size: NonZeroUsize,
    pub seed: u64,
    pub optimizer: OptimizerSpec,
}
