use crate::Result;

/// A first order learning rule over a flat parameter slice.
pub trait Optimizer {
    /// Makes one step over `params` using `grad`.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient of the loss with respect to `params`.
    ///
    /// # Returns
    /// An error if both slices differ in length.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;

    fn learning_rate(&self) -> f32;

    /// Replaces the learning rate used by the following steps.
    fn set_learning_rate(&mut self, lr: f32);
}
