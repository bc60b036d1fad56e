use super::{Optimizer, check_lengths};
use crate::Result;

/// Adam with bias correction and coupled L2 weight decay.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    weight_decay: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    v: Box<[f32]>,
    s: Box<[f32]>,
    epsilon: f32,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `weight_decay` - The L2 penalty added to the gradient before the moments.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(
        len: usize,
        learning_rate: f32,
        weight_decay: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Self {
        Self {
            learning_rate,
            weight_decay,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
            epsilon,
        }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_lengths(params, grad)?;
        check_lengths(params, &self.v)?;

        let Self {
            learning_rate: lr,
            weight_decay: wd,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                let g = g + wd * *p;
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);

                let v_hat = *v / bc1;
                let s_hat = *s / bc2;
                *p -= lr * v_hat / (s_hat.sqrt() + eps);
            });

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
    fn first_step_moves_each_parameter_by_the_learning_rate() {
        let mut adam = Adam::new(3, 0.1, 0.0, 0.9, 0.999, 1e-8);
        let mut params = [1.0, 1.0, 1.0];
        adam.update_params(&mut params, &[0.5, -2.0, 0.0]).unwrap();

        assert!((params[0] - 0.9).abs() < 1e-5);
        assert!((params[1] - 1.1).abs() < 1e-5);
        assert_eq!(params[2], 1.0);
    }

    #[test]
    fn rejects_gradients_of_another_size() {
        let mut adam = Adam::new(2, 0.1, 0.0, 0.9, 0.999, 1e-8);
        assert!(adam.update_params(&mut [0.0; 2], &[0.0; 3]).is_err());
        assert!(adam.update_params(&mut [0.0; 3], &[0.0; 3]).is_err());
    }

    #[test]
    fn reduced_learning_rate_takes_smaller_steps() {
        let mut adam = Adam::new(1, 0.1, 0.0, 0.9, 0.999, 1e-8);
        adam.set_learning_rate(0.01);

        let mut params = [0.0];
        adam.update_params(&mut params, &[1.0]).unwrap();
        assert!((params[0] + 0.01).abs() < 1e-5);
    }
}
