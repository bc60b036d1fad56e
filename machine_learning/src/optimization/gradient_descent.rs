use super::{Optimizer, check_lengths};
use crate::Result;

/// Gradient descent optimization algorithm with L2 weight decay.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f32,
    weight_decay: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    /// * `weight_decay` - The L2 penalty added to the gradient.
    pub fn new(learning_rate: f32, weight_decay: f32) -> Self {
        Self {
            learning_rate,
            weight_decay,
        }
    }
}

impl Optimizer for GradientDescent {
    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_lengths(params, grad)?;

        let Self {
            learning_rate: lr,
            weight_decay: wd,
        } = *self;

        for (w, g) in params.iter_mut().zip(grad) {
            *w -= lr * (g + wd * *w);
        }

        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut optimizer = GradientDescent::new(0.5, 0.0);
        let mut params = [1.0, -1.0];
        optimizer.update_params(&mut params, &[2.0, -4.0]).unwrap();

        assert_eq!(params, [0.0, 1.0]);
    }

    #[test]
    fn weight_decay_shrinks_parameters_without_gradient() {
        let mut optimizer = GradientDescent::new(0.1, 0.5);
        let mut params = [2.0];
        optimizer.update_params(&mut params, &[0.0]).unwrap();

        assert!((params[0] - 1.9).abs() < 1e-6);
    }

    #[test]
    fn learning_rate_can_be_replaced() {
        let mut optimizer = GradientDescent::new(0.1, 0.0);
        optimizer.set_learning_rate(0.01);
        assert_eq!(optimizer.learning_rate(), 0.01);
        assert!(optimizer.update_params(&mut [0.0; 2], &[0.0]).is_err());
    }
}
