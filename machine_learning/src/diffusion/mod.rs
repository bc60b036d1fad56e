//! K-hop feature diffusion through the symmetrically normalized adjacency.
//!
//! The diffused features are computed once before training and then only
//! read by index, see [`FeatureSequence`].

mod features;
mod operator;

pub use features::FeatureSequence;
pub use operator::DiffusionOperator;
