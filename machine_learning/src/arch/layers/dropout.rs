use ndarray::Array2;
use rand::Rng;

/// Inverted dropout: during training each unit is zeroed with probability
/// `p` and the survivors are scaled by `1 / (1 - p)`, so inference is the
/// identity.
#[derive(Debug, Clone)]
pub struct Dropout {
    p: f32,
    mask: Option<Array2<f32>>,
}

impl Dropout {
    /// Creates a new `Dropout`, `p` is expected to be in `[0, 1)`.
    pub fn new(p: f32) -> Self {
        Self { p, mask: None }
    }

    pub fn p(&self) -> f32 {
        self.p
    }

    /// Applies a freshly sampled mask to `x` and keeps it for `backward`.
    pub fn forward<R: Rng>(&mut self, mut x: Array2<f32>, rng: &mut R) -> Array2<f32> {
        if self.p <= 0.0 {
            self.mask = None;
            return x;
        }

        let keep = 1.0 - self.p;
        let mask = Array2::from_shape_simple_fn(x.raw_dim(), || {
            if rng.random_bool(keep as f64) {
                1.0 / keep
            } else {
                0.0
            }
        });

        x *= &mask;
        self.mask = Some(mask);
        x
    }

    /// Routes the delta through the last sampled mask.
    pub fn backward(&self, mut d: Array2<f32>) -> Array2<f32> {
        if let Some(mask) = &self.mask {
            d *= mask;
        }

        d
    }

    /// Drops the stored mask, used before inference passes.
    pub fn clear(&mut self) {
        self.mask = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn zero_probability_is_the_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dropout = Dropout::new(0.0);
        let x = Array2::from_elem((3, 4), 2.0);

        assert_eq!(dropout.forward(x.clone(), &mut rng), x);
        assert_eq!(dropout.backward(x.clone()), x);
    }

    #[test]
    fn survivors_are_rescaled_and_backward_reuses_the_mask() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut dropout = Dropout::new(0.5);
        let x = Array2::ones((8, 8));

        let y = dropout.forward(x.clone(), &mut rng);
        assert!(y.iter().all(|&v| v == 0.0 || v == 2.0));
        assert!(y.iter().any(|&v| v == 0.0));

        let d = dropout.backward(x);
        assert_eq!(d, y);
    }
}
