use super::Metrics;
use crate::Result;

/// The collaborator an epoch loop drives: it owns the model, the optimizer
/// and the data, and exposes one pass of training and one of evaluation.
pub trait Trainer {
    /// Makes one pass over the training nodes, updating the parameters.
    ///
    /// # Returns
    /// The training metrics of the pass or an error if it failed.
    fn train(&mut self) -> Result<Metrics>;

    /// Evaluates the current parameters without modifying them.
    ///
    /// # Returns
    /// The evaluation metrics, which always include `val_loss`.
    fn evaluate(&mut self) -> Result<Metrics>;

    fn learning_rate(&self) -> f32;

    /// Replaces the learning rate used by the following training passes.
    fn set_learning_rate(&mut self, lr: f32);

    /// Returns the amount of trainable parameters.
    fn trainable_params(&self) -> usize;
}
