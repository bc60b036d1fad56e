use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The lifecycle of a run, every `Stopped*` state being terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Running,
    StoppedBudget,
    StoppedEarlyStop,
    StoppedError,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        self != RunState::Running
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Running => "running",
            RunState::StoppedBudget => "stopped_budget",
            RunState::StoppedEarlyStop => "stopped_early_stop",
            RunState::StoppedError => "stopped_error",
        };

        write!(f, "{name}")
    }
}
