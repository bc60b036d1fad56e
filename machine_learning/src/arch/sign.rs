use std::ops::Range;

use ndarray::{Array2, Axis, concatenate, s};
use rand::rngs::StdRng;

use super::{
    init::xavier_uniform,
    layers::{Dense, Dropout},
};
use crate::{MlErr, Result, optimization::Optimizer};

/// The shape hyperparameters of a `Sign` network.
#[derive(Debug, Clone, Copy)]
pub struct SignShape {
    pub num_features: usize,
    pub hidden: usize,
    pub num_classes: usize,
    pub k: usize,
    pub dropout: f32,
    pub input_dropout: f32,
}

/// A scalable inception network over precomputed diffused features.
///
/// Each hop `i` goes through its own `Dense(F, H)` with ReLU, the `K + 1`
/// hidden blocks are concatenated and a final `Dense((K + 1) H, C)` produces
/// the class logits. Every parameter lives in one flat buffer, hops first
/// and the head last.
#[derive(Debug, Clone)]
pub struct Sign {
    shape: SignShape,
    hops: Vec<Dense>,
    head: Dense,
    input_dropout: Vec<Dropout>,
    dropout: Dropout,
    offsets: Vec<usize>,
    params: Vec<f32>,
    grad: Vec<f32>,
}

impl Sign {
    /// Creates a new `Sign` with Xavier uniform weights and zero biases.
    ///
    /// # Arguments
    /// * `shape` - The network's dimensions and dropout rates.
    /// * `rng` - The generator used for the initialization.
    ///
    /// # Returns
    /// The network or an error if a layer has no units.
    pub fn new(shape: SignShape, rng: &mut StdRng) -> Result<Self> {
        let blocks = shape.k + 1;

        let hops: Vec<Dense> = (0..blocks)
            .map(|_| Dense::new((shape.num_features, shape.hidden), true))
            .collect();
        let head = Dense::new((blocks * shape.hidden, shape.num_classes), false);

        let mut offsets = Vec::with_capacity(blocks + 2);
        offsets.push(0);
        for size in hops.iter().chain([&head]).map(Dense::size) {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + size);
        }

        let size = offsets[offsets.len() - 1];
        let mut params = vec![0.0; size];

        for (i, layer) in hops.iter().chain([&head]).enumerate() {
            let (fan_in, fan_out) = layer.dim();
            let weights = offsets[i]..offsets[i] + layer.weights_len();
            xavier_uniform(rng, fan_in, fan_out, &mut params[weights])?;
        }

        Ok(Self {
            shape,
            hops,
            head,
            input_dropout: (0..blocks)
                .map(|_| Dropout::new(shape.input_dropout))
                .collect(),
            dropout: Dropout::new(shape.dropout),
            offsets,
            params,
            grad: vec![0.0; size],
        })
    }

    /// Returns the amount of trainable parameters.
    pub fn size(&self) -> usize {
        self.params.len()
    }

    pub fn shape(&self) -> SignShape {
        self.shape
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    /// Runs a training pass, sampling fresh dropout masks.
    ///
    /// # Arguments
    /// * `xs` - One `[B, F]` matrix per hop.
    /// * `rng` - The generator for the dropout masks.
    ///
    /// # Returns
    /// The `[B, C]` logits.
    pub fn forward_train(&mut self, xs: &[Array2<f32>], rng: &mut StdRng) -> Result<Array2<f32>> {
        self.forward_inner(xs, Some(rng))
    }

    /// Runs an inference pass, dropout disabled.
    pub fn predict(&mut self, xs: &[Array2<f32>]) -> Result<Array2<f32>> {
        self.forward_inner(xs, None)
    }

    /// Backpropagates the delta of the logits of the last `forward_train`
    /// and overwrites the gradient buffer.
    pub fn backward(&mut self, d_logits: Array2<f32>) -> Result<()> {
        let head = layer_range(&self.offsets, self.hops.len());
        let d = self.head.backward(
            &self.params[head.clone()],
            &mut self.grad[head],
            d_logits,
        )?;
        let d = self.dropout.backward(d);

        let h = self.shape.hidden;
        for (i, layer) in self.hops.iter_mut().enumerate() {
            let range = layer_range(&self.offsets, i);
            let d_i = d.slice(s![.., i * h..(i + 1) * h]).to_owned();
            layer.backward(&self.params[range.clone()], &mut self.grad[range], d_i)?;
        }

        Ok(())
    }

    /// Applies one optimizer step with the current gradient.
    pub fn apply(&mut self, optimizer: &mut dyn Optimizer) -> Result<()> {
        optimizer.update_params(&mut self.params, &self.grad)
    }

    fn forward_inner(
        &mut self,
        xs: &[Array2<f32>],
        mut rng: Option<&mut StdRng>,
    ) -> Result<Array2<f32>> {
        if xs.len() != self.hops.len() {
            return Err(MlErr::SizeMismatch {
                a: "hop inputs",
                b: "hop layers",
                got: xs.len(),
                expected: self.hops.len(),
            });
        }

        let mut hidden = Vec::with_capacity(xs.len());
        for (i, x) in xs.iter().enumerate() {
            let x = match rng.as_deref_mut() {
                Some(rng) => self.input_dropout[i].forward(x.clone(), rng),
                None => {
                    self.input_dropout[i].clear();
                    x.clone()
                }
            };

            let range = layer_range(&self.offsets, i);
            hidden.push(self.hops[i].forward(&self.params[range], x.view())?);
        }

        let views: Vec<_> = hidden.iter().map(|h| h.view()).collect();
        let concat = concatenate(Axis(1), &views)?;
        let concat = match rng {
            Some(rng) => self.dropout.forward(concat, rng),
            None => {
                self.dropout.clear();
                concat
            }
        };

        let head = layer_range(&self.offsets, self.hops.len());
        self.head.forward(&self.params[head], concat.view())
    }
}

fn layer_range(offsets: &[usize], layer: usize) -> Range<usize> {
    offsets[layer]..offsets[layer + 1]
}
