use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use trainer::{EarlyStopMode, Result, TrainErr};

use crate::Dataset;

/// The optimizer families a run can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    Adam,
    GradientDescent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OptimizerConfig {
    pub kind: OptimizerKind,
    pub lr: f32,
    pub weight_decay: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            kind: OptimizerKind::Adam,
            lr: 1e-3,
            weight_decay: 1e-3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LrReduceConfig {
    pub factor: f32,
    pub patience: usize,
    pub min_lr: f32,
    pub threshold: f64,
}

impl Default for LrReduceConfig {
    fn default() -> Self {
        Self {
            factor: 0.1,
            patience: 5,
            min_lr: 1e-6,
            threshold: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EarlyStopSettings {
    pub patience: usize,
    pub mode: EarlyStopMode,
}

impl Default for EarlyStopSettings {
    fn default() -> Self {
        Self {
            patience: 15,
            mode: EarlyStopMode::Best,
        }
    }
}

/// Everything a single run needs, read once from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub dataset: Dataset,
    pub graph_path: PathBuf,
    #[serde(default = "defaults::seed")]
    pub seed: u64,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default = "defaults::epochs")]
    pub epochs: usize,
    #[serde(default = "defaults::hidden_channel")]
    pub hidden_channel: usize,
    #[serde(default = "defaults::dropout")]
    pub dropout: f32,
    #[serde(default)]
    pub input_dropout: f32,
    #[serde(default = "defaults::k")]
    pub k: usize,
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,
    #[serde(default = "defaults::eval_batch_size")]
    pub eval_batch_size: usize,
    #[serde(default)]
    pub lr_reduce: LrReduceConfig,
    #[serde(default)]
    pub early_stop: EarlyStopSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

mod defaults {
    pub fn seed() -> u64 {
        42
    }

    pub fn epochs() -> usize {
        200
    }

    pub fn hidden_channel() -> usize {
        512
    }

    pub fn dropout() -> f32 {
        0.5
    }

    pub fn k() -> usize {
        5
    }

    pub fn batch_size() -> usize {
        50_000
    }

    pub fn eval_batch_size() -> usize {
        100_000
    }
}

impl RunConfig {
    /// Parses a run configuration from JSON.
    ///
    /// # Returns
    /// The configuration or `TrainErr::Config` on unknown or mistyped keys,
    /// a negative `k` included.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TrainErr::Config(format!("invalid run config: {e}")))
    }

    /// Reads a run configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TrainErr::Config(format!("cannot read '{}': {e}", path.display())))?;

        Self::from_json(&content)
    }
}
