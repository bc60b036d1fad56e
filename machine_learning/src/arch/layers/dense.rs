use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, linalg};

use crate::Result;

/// A fully connected layer `a = act(x W + b)` whose parameters live in an
/// external flat slice laid out as `[W (row major, n x m) | b (m)]`.
///
/// The layer keeps the last forward input and pre-activation so that a
/// following `backward` call can compute the gradients.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    relu: bool,
    size: usize,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The `(inputs, outputs)` dimensions.
    /// * `relu` - Whether a ReLU is applied on the output.
    pub fn new(dim: (usize, usize), relu: bool) -> Self {
        let zeros = Array2::zeros((0, 0));

        Self {
            dim,
            relu,
            size: (dim.0 + 1) * dim.1,
            x: zeros.clone(),
            z: zeros,
        }
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Returns the amount of weights, the biases follow them in the parameter slice.
    pub fn weights_len(&self) -> usize {
        self.dim.0 * self.dim.1
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (w, b) = self.view_params(params)?;

        let mut z = x.dot(&w);
        z += &b;

        self.x = x.to_owned();
        let a = if self.relu {
            z.mapv(|v| v.max(0.0))
        } else {
            z.clone()
        };
        self.z = z;

        Ok(a)
    }

    /// Writes this layer's gradient into `grad` and returns the delta with
    /// respect to the layer's input.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's gradient buffer, overwritten.
    /// * `d` - The delta with respect to this layer's output.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        if self.relu {
            d.zip_mut_with(&self.z, |d, &z| {
                if z <= 0.0 {
                    *d = 0.0;
                }
            });
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let split = self.weights_len().min(grad.len());
        let (dw_raw, db_raw) = grad.split_at_mut(split);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw)?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw)?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        let (w_raw, b_raw) = params.split_at(self.weights_len().min(params.len()));
        let weights = ArrayView2::from_shape(self.dim, w_raw)?;
        let biases = ArrayView1::from_shape(self.dim.1, b_raw)?;
        Ok((weights, biases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn forward_applies_weights_bias_and_relu() {
        // W = [[1, -1], [2, 0]], b = [0.5, -3]
        let params = [1.0, -1.0, 2.0, 0.0, 0.5, -3.0];
        let mut layer = Dense::new((2, 2), true);
        assert_eq!(layer.size(), params.len());

        let a = layer.forward(&params, array![[1.0, 1.0]].view()).unwrap();
        assert_eq!(a, array![[3.5, 0.0]]);
    }

    #[test]
    fn backward_matches_manual_gradient() {
        let params = [1.0, -1.0, 2.0, 0.0, 0.5, -3.0];
        let mut layer = Dense::new((2, 2), true);
        layer.forward(&params, array![[1.0, 2.0]].view()).unwrap();

        // z = [5.5, -4.0], relu masks the second output.
        let mut grad = [0.0; 6];
        let dx = layer.backward(&params, &mut grad, array![[1.0, 1.0]]).unwrap();

        assert_eq!(grad, [1.0, 0.0, 2.0, 0.0, 1.0, 0.0]);
        assert_eq!(dx, array![[1.0, 2.0]]);
    }

    #[test]
    fn short_parameter_slice_is_an_error() {
        let mut layer = Dense::new((2, 2), false);
        assert!(layer.forward(&[1.0; 3], array![[1.0, 1.0]].view()).is_err());
    }
}
