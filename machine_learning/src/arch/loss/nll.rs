use ndarray::{Array2, ArrayView2, Axis};

use super::LossFn;

/// Negative log-likelihood of the log-softmax of the logits, that is, the
/// multi-class cross entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nll;

impl Nll {
    /// Returns a new `Nll`.
    pub fn new() -> Self {
        Self
    }
}

/// Computes the row-wise log-softmax of `logits` in a numerically stable way.
pub fn log_softmax(logits: ArrayView2<f32>) -> Array2<f32> {
    let mut out = logits.to_owned();

    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let lse = max + row.fold(0.0, |acc, &v| acc + (v - max).exp()).ln();
        row.mapv_inplace(|v| v - lse);
    }

    out
}

impl LossFn for Nll {
    fn loss(&self, logits: ArrayView2<f32>, labels: &[usize]) -> f32 {
        if labels.is_empty() {
            return 0.0;
        }

        let log_probs = log_softmax(logits);
        let total: f32 = labels
            .iter()
            .enumerate()
            .map(|(i, &y)| -log_probs[[i, y]])
            .sum();

        total / labels.len() as f32
    }

    fn loss_prime(&self, logits: ArrayView2<f32>, labels: &[usize]) -> Array2<f32> {
        let n = labels.len().max(1) as f32;
        let mut d = log_softmax(logits).mapv_into(f32::exp);

        for (i, &y) in labels.iter().enumerate() {
            d[[i, y]] -= 1.0;
        }

        d / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn uniform_logits_cost_log_of_classes() {
        let logits = Array2::zeros((2, 4));
        let loss = Nll.loss(logits.view(), &[0, 3]);
        assert!((loss - 4.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn log_softmax_is_stable_for_large_logits() {
        let out = log_softmax(array![[1000.0f32, 1000.0]].view());
        assert!(out.iter().all(|v| v.is_finite()));
        assert!((out[[0, 0]] + 2.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn gradient_is_softmax_minus_one_hot() {
        let logits = array![[0.0f32, 0.0], [0.0, 0.0]];
        let d = Nll.loss_prime(logits.view(), &[0, 1]);

        let expected = array![[-0.25f32, 0.25], [0.25, -0.25]];
        for (got, want) in d.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6);
        }
    }
}
