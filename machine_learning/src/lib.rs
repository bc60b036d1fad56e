pub mod arch;
pub mod diffusion;
pub mod error;
pub mod graph;
pub mod loader;
pub mod optimization;
pub mod scoring;
pub mod specs;
pub mod timing;
pub mod training;

pub use error::{MlErr, Result};
