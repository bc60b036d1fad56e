pub use machine_learning::timing::timed;

use serde::Serialize;

/// Mean and population standard deviation of a set of durations, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeStats {
    pub mean: f64,
    pub std: f64,
}

impl TimeStats {
    /// Summarizes `samples`, all zeros when there are none.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std: var.sqrt(),
        }
    }
}
