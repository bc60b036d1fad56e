mod config;
mod controller;
mod error;
pub mod policy;
mod record;
pub mod sink;
mod state;
mod summary;
pub mod timing;

pub use config::{ControllerConfig, EarlyStopConfig, EarlyStopMode, PlateauConfig};
pub use controller::{EpochController, RunOutcome};
pub use error::{Result, SinkErr, StepKind, TrainErr};
pub use record::{EpochRecord, StepReport};
pub use state::RunState;
pub use summary::{BestEpoch, RunSummary};
