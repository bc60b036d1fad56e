use std::num::NonZeroUsize;

use machine_learning::specs::{OptimizerSpec, SignSpec};
use trainer::{ControllerConfig, EarlyStopConfig, PlateauConfig, Result, TrainErr};

use crate::{
    RunConfig,
    config::{OptimizerConfig, OptimizerKind},
};

/// Turns a user facing `RunConfig` into the specs the trainer and the
/// controller are built from.
#[derive(Debug, Default)]
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Validates `config` and derives the model and controller specs.
    ///
    /// # Returns
    /// Both specs or `TrainErr::Config` describing the first invalid value.
    pub fn adapt(&self, config: &RunConfig) -> Result<(SignSpec, ControllerConfig)> {
        self.validate(config)?;

        let sign = self.adapt_sign(config)?;
        let controller = self.adapt_controller(config)?;
        Ok((sign, controller))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate(&self, config: &RunConfig) -> Result<()> {
        for (name, p) in [
            ("dropout", config.dropout),
            ("input_dropout", config.input_dropout),
        ] {
            if !(0.0..1.0).contains(&p) {
                return Err(TrainErr::Config(format!("{name} must be in [0, 1), got {p}")));
            }
        }

        if config.hidden_channel == 0 {
            return Err(TrainErr::Config("hidden_channel must be positive".into()));
        }

        let OptimizerConfig { lr, weight_decay, .. } = config.optimizer;
        if !(lr > 0.0 && lr.is_finite()) {
            return Err(TrainErr::Config(format!(
                "optimizer lr must be a positive number, got {lr}"
            )));
        }

        if !(weight_decay >= 0.0 && weight_decay.is_finite()) {
            return Err(TrainErr::Config(format!(
                "optimizer weight_decay must be non negative, got {weight_decay}"
            )));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    fn adapt_sign(&self, config: &RunConfig) -> Result<SignSpec> {
        let OptimizerConfig {
            kind,
            lr,
            weight_decay,
        } = config.optimizer;

        let optimizer = match kind {
            OptimizerKind::Adam => OptimizerSpec::adam(lr, weight_decay),
            OptimizerKind::GradientDescent => OptimizerSpec::GradientDescent {
                learning_rate: lr,
                weight_decay,
            },
        };

        Ok(SignSpec {
            hidden: config.hidden_channel,
            k: config.k,
            dropout: config.dropout,
            input_dropout: config.input_dropout,
            batch_size: non_zero("batch_size", config.batch_size)?,
            eval_batch_size: non_zero("eval_batch_size", config.eval_batch_size)?,
            seed: config.seed,
            optimizer,
        })
    }

    fn adapt_controller(&self, config: &RunConfig) -> Result<ControllerConfig> {
        let lr_reduce = config.lr_reduce;
        let plateau = PlateauConfig::new(
            lr_reduce.factor,
            non_zero("lr_reduce.patience", lr_reduce.patience)?,
            lr_reduce.min_lr,
            lr_reduce.threshold,
        )?;

        let early_stop = EarlyStopConfig::new(
            non_zero("early_stop.patience", config.early_stop.patience)?,
            config.early_stop.mode,
        );

        Ok(ControllerConfig::new(
            non_zero("epochs", config.epochs)?,
            plateau,
            early_stop,
        ))
    }
}

fn non_zero(name: &str, value: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(value).ok_or_else(|| TrainErr::Config(format!("{name} must be positive")))
}
