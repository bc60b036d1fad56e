use log::{error, info, warn};
use machine_learning::training::Trainer;

use crate::{
    ControllerConfig, EpochRecord, Result, RunState, RunSummary, StepKind, StepReport, TrainErr,
    policy::{EarlyStopping, PlateauScheduler},
    sink::MetricSink,
    timing::timed,
};

/// How a finished run ended and everything it recorded.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: RunState,
    pub records: Vec<EpochRecord>,
    pub summary: RunSummary,
}

/// Drives a `Trainer` epoch by epoch, reducing the learning rate on
/// plateaus and stopping early when the validation loss keeps getting worse.
pub struct EpochController<T: Trainer> {
    config: ControllerConfig,
    trainer: T,
    plateau: PlateauScheduler,
    early_stop: EarlyStopping,
    sinks: Vec<Box<dyn MetricSink>>,
    records: Vec<EpochRecord>,
    state: RunState,
    epoch: usize,
}

impl<T: Trainer> EpochController<T> {
    /// Creates a new `EpochController` in the `Running` state at epoch zero.
    ///
    /// # Arguments
    /// * `config` - The epoch budget and the policies' parameters.
    /// * `trainer` - The collaborator that trains and evaluates the model.
    pub fn new(config: ControllerConfig, trainer: T) -> Self {
        Self {
            plateau: PlateauScheduler::new(config.plateau()),
            early_stop: EarlyStopping::new(config.early_stop()),
            config,
            trainer,
            sinks: Vec::new(),
            records: Vec::new(),
            state: RunState::Running,
            epoch: 0,
        }
    }

    /// Adds a destination for the epoch records.
    pub fn with_sink<S: MetricSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn MetricSink>) {
        self.sinks.push(sink);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns the amount of epochs completed so far.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    pub fn into_trainer(self) -> T {
        self.trainer
    }

    /// Runs a single epoch: train, evaluate, feed the policies and emit the
    /// record. Calling it on a stopped controller does nothing.
    ///
    /// # Returns
    /// The state after the epoch, or the step's failure, which leaves the
    /// controller in `StoppedError`.
    pub fn step_epoch(&mut self) -> Result<RunState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let epoch = self.epoch;
        if epoch == 0 {
            info!(params = self.trainer.trainable_params(); "trainable parameters");
        }

        let lr = self.trainer.learning_rate();

        let (train, train_time) = timed(|| self.trainer.train());
        let train = match train {
            Ok(metrics) => metrics,
            Err(source) => {
                return Err(self.fail(TrainErr::Step {
                    epoch,
                    step: StepKind::Train,
                    source,
                }));
            }
        };

        let (eval, eval_time) = timed(|| self.trainer.evaluate());
        let eval = match eval {
            Ok(metrics) => metrics,
            Err(source) => {
                return Err(self.fail(TrainErr::Step {
                    epoch,
                    step: StepKind::Eval,
                    source,
                }));
            }
        };

        let Some(val_loss) = eval.get("val_loss") else {
            return Err(self.fail(TrainErr::MissingMetric {
                epoch,
                name: "val_loss",
            }));
        };

        if let Some(new_lr) = self.plateau.step(val_loss, lr) {
            self.trainer.set_learning_rate(new_lr);
            info!(epoch = epoch, from = lr, to = new_lr; "reducing learning rate");
        }

        if self.early_stop.step(val_loss) {
            self.state = RunState::StoppedEarlyStop;
            info!(
                epoch = epoch,
                triggers = self.early_stop.triggers();
                "early stop triggered"
            );
        }

        let record = EpochRecord {
            epoch,
            learning_rate: lr,
            train: StepReport::new(train, train_time),
            eval: StepReport::new(eval, eval_time),
        };
        self.emit(record);

        self.epoch += 1;
        if self.epoch >= self.config.epochs() && self.state == RunState::Running {
            self.state = RunState::StoppedBudget;
        }

        Ok(self.state)
    }

    /// Runs epochs until a terminal state, then hands the summary to every
    /// sink.
    ///
    /// # Returns
    /// The outcome of the run, or the failure that stopped it. Sinks receive
    /// the summary in both cases.
    pub fn run(&mut self) -> Result<RunOutcome> {
        while !self.state.is_terminal() {
            if let Err(e) = self.step_epoch() {
                self.finish();
                return Err(e);
            }
        }

        let summary = self.finish();
        Ok(RunOutcome {
            state: self.state,
            records: std::mem::take(&mut self.records),
            summary,
        })
    }

    fn fail(&mut self, err: TrainErr) -> TrainErr {
        self.state = RunState::StoppedError;
        error!("{err}");
        err
    }

    fn emit(&mut self, record: EpochRecord) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.publish(&record) {
                warn!(sink = sink.name(), epoch = record.epoch; "failed to publish epoch record: {e}");
            }
        }

        self.records.push(record);
    }

    fn finish(&mut self) -> RunSummary {
        let summary = RunSummary::from_records(
            self.state,
            self.trainer.trainable_params(),
            &self.records,
        );

        for sink in &mut self.sinks {
            if let Err(e) = sink.finish(&summary) {
                warn!(sink = sink.name(); "failed to publish run summary: {e}");
            }
        }

        summary
    }
}
