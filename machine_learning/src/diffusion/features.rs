use log::debug;
use ndarray::{Array2, ArrayView2, Axis};

use super::DiffusionOperator;
use crate::{MlErr, Result, graph::Graph};

/// The features of a graph diffused `0..=K` hops.
///
/// Index `i` holds `Â^i X`, index 0 being the original features. The
/// sequence is built once and only read afterwards.
#[derive(Debug, Clone)]
pub struct FeatureSequence {
    hops: Vec<Array2<f32>>,
}

impl FeatureSequence {
    /// Diffuses the graph's features `k` hops.
    ///
    /// # Arguments
    /// * `graph` - The graph providing the features and the edges.
    /// * `k` - The amount of hops, zero meaning no propagation at all.
    ///
    /// # Returns
    /// A sequence with exactly `k + 1` feature matrices.
    pub fn precompute(graph: &Graph, k: usize) -> Result<Self> {
        if k == 0 {
            return Ok(Self {
                hops: vec![graph.features().clone()],
            });
        }

        let op = DiffusionOperator::from_edges(graph.num_nodes(), graph.edges())?;
        debug!(nodes = op.num_nodes(), nnz = op.nnz(), k = k; "built diffusion operator");

        Self::diffuse(&op, graph.features().clone(), k)
    }

    /// Diffuses `x0` through an already built operator.
    pub fn diffuse(op: &DiffusionOperator, x0: Array2<f32>, k: usize) -> Result<Self> {
        let mut hops = Vec::with_capacity(k + 1);
        let mut current = x0;

        for _ in 0..k {
            let next = op.propagate(current.view())?;
            hops.push(current);
            current = next;
        }

        hops.push(current);
        Ok(Self { hops })
    }

    /// Returns the amount of hops `K`.
    pub fn k(&self) -> usize {
        self.hops.len() - 1
    }

    /// Returns the amount of feature matrices, `K + 1`.
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// A sequence always holds at least the original features.
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn num_features(&self) -> usize {
        self.hops[0].ncols()
    }

    pub fn get(&self, hop: usize) -> Option<ArrayView2<'_, f32>> {
        self.hops.get(hop).map(|x| x.view())
    }

    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'_, f32>> {
        self.hops.iter().map(|x| x.view())
    }

    /// Copies the rows of `nodes` out of one hop's features.
    ///
    /// # Arguments
    /// * `hop` - The hop to read from.
    /// * `nodes` - The node indices, in the order the rows should have.
    ///
    /// # Returns
    /// A `[nodes.len(), F]` matrix or an error if the hop or a node is out of range.
    pub fn gather(&self, hop: usize, nodes: &[usize]) -> Result<Array2<f32>> {
        let x = self.hops.get(hop).ok_or(MlErr::HopOutOfRange {
            hop,
            hops: self.hops.len(),
        })?;

        if let Some(&node) = nodes.iter().find(|&&n| n >= x.nrows()) {
            return Err(MlErr::SizeMismatch {
                a: "node index",
                b: "nodes",
                got: node,
                expected: x.nrows(),
            });
        }

        Ok(x.select(Axis(0), nodes))
    }

    /// Gathers the rows of `nodes` from every hop.
    pub fn gather_all(&self, nodes: &[usize]) -> Result<Vec<Array2<f32>>> {
        (0..self.hops.len())
            .map(|hop| self.gather(hop, nodes))
            .collect()
    }
}
