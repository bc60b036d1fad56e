use ndarray::{Array2, ArrayView2};

/// A classification loss over a batch of logits and their target classes.
pub trait LossFn {
    /// Returns the mean loss of the batch.
    fn loss(&self, logits: ArrayView2<f32>, labels: &[usize]) -> f32;

    /// Returns the derivative of `loss` with respect to the logits.
    fn loss_prime(&self, logits: ArrayView2<f32>, labels: &[usize]) -> Array2<f32>;
}
