use log::debug;
use ndarray::{Array2, Axis, concatenate};
use rand::{SeedableRng, rngs::StdRng};

use super::{Metrics, Trainer};
use crate::{
    MlErr, Result,
    arch::{
        Sign, SignShape,
        loss::{LossFn, Nll},
    },
    diffusion::FeatureSequence,
    graph::{Graph, Split},
    loader::NodeLoader,
    optimization::{Adam, GradientDescent, Optimizer},
    scoring::Scorer,
    specs::{OptimizerSpec, SignSpec},
    timing::timed,
};

/// Trains a `Sign` network for node classification over precomputed
/// diffused features.
pub struct SignTrainer {
    model: Sign,
    optimizer: Box<dyn Optimizer>,
    loss: Nll,
    features: FeatureSequence,
    labels: Vec<usize>,
    masks: [Vec<bool>; 3],
    train_loader: NodeLoader,
    eval_loader: NodeLoader,
    scorer: Scorer,
    rng: StdRng,
}

impl SignTrainer {
    /// Creates a new `SignTrainer`.
    ///
    /// # Arguments
    /// * `spec` - The model, loader and optimizer hyperparameters.
    /// * `graph` - The graph providing labels, masks and the class count.
    /// * `features` - The features of `graph` diffused `spec.k` hops.
    /// * `scorer` - The metric used for the train, val and test scores.
    ///
    /// # Returns
    /// The trainer or an error if the features don't match the graph.
    pub fn new(
        spec: &SignSpec,
        graph: &Graph,
        features: FeatureSequence,
        scorer: Scorer,
    ) -> Result<Self> {
        if features.len() != spec.k + 1 {
            return Err(MlErr::SizeMismatch {
                a: "feature sequence",
                b: "hops",
                got: features.len(),
                expected: spec.k + 1,
            });
        }

        let rows = features.get(0).map_or(0, |x| x.nrows());
        if rows != graph.num_nodes() {
            return Err(MlErr::SizeMismatch {
                a: "feature sequence",
                b: "nodes",
                got: rows,
                expected: graph.num_nodes(),
            });
        }

        let mut rng = StdRng::seed_from_u64(spec.seed);
        let shape = SignShape {
            num_features: features.num_features(),
            hidden: spec.hidden,
            num_classes: graph.num_classes(),
            k: spec.k,
            dropout: spec.dropout,
            input_dropout: spec.input_dropout,
        };
        let model = Sign::new(shape, &mut rng)?;
        let optimizer = resolve_optimizer(spec.optimizer, model.size());

        debug!(params = model.size(), hops = features.len(); "built sign trainer");

        Ok(Self {
            model,
            optimizer,
            loss: Nll::new(),
            features,
            labels: graph.labels().to_vec(),
            masks: Split::ALL.map(|split| graph.mask(split).to_vec()),
            train_loader: NodeLoader::new(graph.nodes(Split::Train), spec.batch_size, true),
            eval_loader: NodeLoader::new(
                (0..graph.num_nodes()).collect(),
                spec.eval_batch_size,
                false,
            ),
            scorer,
            rng,
        })
    }

    /// Runs inference over every node in batches.
    ///
    /// # Returns
    /// The `[N, C]` logits and the summed inference seconds.
    fn infer(&mut self) -> Result<(Array2<f32>, f64)> {
        let mut outputs = Vec::with_capacity(self.eval_loader.num_batches());
        let mut forward_time = 0.0;

        for batch in self.eval_loader.batches(&mut self.rng) {
            let xs = self.features.gather_all(batch)?;
            let (logits, elapsed) = timed(|| self.model.predict(&xs));
            outputs.push(logits?);
            forward_time += elapsed.as_secs_f64();
        }

        let views: Vec<_> = outputs.iter().map(|o| o.view()).collect();
        Ok((concatenate(Axis(0), &views)?, forward_time))
    }
}

impl Trainer for SignTrainer {
    fn train(&mut self) -> Result<Metrics> {
        if self.train_loader.is_empty() {
            return Err(MlErr::EmptyBatch);
        }

        let mut total = 0.0;
        for batch in self.train_loader.batches(&mut self.rng) {
            let xs = self.features.gather_all(batch)?;
            let labels: Vec<usize> = batch.iter().map(|&n| self.labels[n]).collect();

            let logits = self.model.forward_train(&xs, &mut self.rng)?;
            total += self.loss.loss(logits.view(), &labels) as f64 * batch.len() as f64;

            let d = self.loss.loss_prime(logits.view(), &labels);
            self.model.backward(d)?;
            self.model.apply(self.optimizer.as_mut())?;
        }

        let train_loss = total / self.train_loader.len() as f64;
        Ok(Metrics::new().with("loss", train_loss))
    }

    fn evaluate(&mut self) -> Result<Metrics> {
        let (logits, forward_time) = self.infer()?;
        let preds: Vec<usize> = logits
            .axis_iter(Axis(0))
            .map(|row| argmax(row.iter().copied()))
            .collect();

        let mut metrics = Metrics::new().with("forward_time", forward_time);

        for (split, mask) in Split::ALL.into_iter().zip(&self.masks) {
            let nodes: Vec<usize> = mask
                .iter()
                .enumerate()
                .filter_map(|(i, &m)| m.then_some(i))
                .collect();
            let split_preds: Vec<usize> = nodes.iter().map(|&n| preds[n]).collect();
            let split_labels: Vec<usize> = nodes.iter().map(|&n| self.labels[n]).collect();

            let score = self.scorer.score(&split_preds, &split_labels);
            metrics.insert(format!("{}_{}", split.name(), self.scorer.name()), score);

            if split == Split::Val {
                let val_logits = logits.select(Axis(0), &nodes);
                let val_loss = self.loss.loss(val_logits.view(), &split_labels);
                metrics.insert("val_loss", val_loss as f64);
            }
        }

        Ok(metrics)
    }

    fn learning_rate(&self) -> f32 {
        self.optimizer.learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.optimizer.set_learning_rate(lr);
    }

    fn trainable_params(&self) -> usize {
        self.model.size()
    }
}

fn resolve_optimizer(spec: OptimizerSpec, len: usize) -> Box<dyn Optimizer> {
    match spec {
        OptimizerSpec::Adam {
            learning_rate,
            weight_decay,
            beta1,
            beta2,
            epsilon,
        } => Box::new(Adam::new(
            len,
            learning_rate,
            weight_decay,
            beta1,
            beta2,
            epsilon,
        )),
        OptimizerSpec::GradientDescent {
            learning_rate,
            weight_decay,
        } => Box::new(GradientDescent::new(learning_rate, weight_decay)),
    }
}

/// Index of the largest value, the first one on ties.
fn argmax(values: impl Iterator<Item = f32>) -> usize {
    values
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, v)| {
            if v > best { (i, v) } else { (best_i, best) }
        })
        .0
}
