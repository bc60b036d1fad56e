//! Per-epoch policies fed with the validation loss.

mod early_stop;
mod plateau;

pub use early_stop::EarlyStopping;
pub use plateau::PlateauScheduler;
