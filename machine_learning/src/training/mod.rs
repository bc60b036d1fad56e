mod metrics;
mod sign_trainer;
mod trainer;

pub use metrics::Metrics;
pub use sign_trainer::SignTrainer;
pub use trainer::Trainer;
