pub mod init;
pub mod layers;
pub mod loss;
mod sign;

pub use sign::{Sign, SignShape};
