mod adapter;
pub mod config;
mod dataset;
mod run;

pub use adapter::Adapter;
pub use config::RunConfig;
pub use dataset::Dataset;
pub use run::{CONFIG_FILE, METRICS_FILE, persist_config, run, run_with_sinks};
