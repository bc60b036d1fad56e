use std::{
    error::Error,
    fmt::{self, Display},
};

use machine_learning::MlErr;

/// The trainer module's result type.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// The two collaborator calls made every epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Train,
    Eval,
}

impl Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Train => write!(f, "train"),
            StepKind::Eval => write!(f, "eval"),
        }
    }
}

/// Run failures.
#[derive(Debug)]
pub enum TrainErr {
    Config(String),
    Data(MlErr),
    Step {
        epoch: usize,
        step: StepKind,
        source: MlErr,
    },
    MissingMetric {
        epoch: usize,
        name: &'static str,
    },
}

impl Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::Config(msg) => write!(f, "invalid configuration: {msg}"),
            TrainErr::Data(e) => write!(f, "invalid data: {e}"),
            TrainErr::Step {
                epoch,
                step,
                source,
            } => write!(f, "{step} step failed at epoch {epoch}: {source}"),
            TrainErr::MissingMetric { epoch, name } => {
                write!(f, "eval step at epoch {epoch} did not report {name}")
            }
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Data(e) => Some(e),
            TrainErr::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MlErr> for TrainErr {
    fn from(value: MlErr) -> Self {
        Self::Data(value)
    }
}

/// Failures of a metric sink, reported but never fatal to a run.
#[derive(Debug)]
pub enum SinkErr {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for SinkErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkErr::Io(e) => write!(f, "io error: {e}"),
            SinkErr::Json(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl Error for SinkErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SinkErr::Io(e) => Some(e),
            SinkErr::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SinkErr {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SinkErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
