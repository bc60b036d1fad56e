use ndarray::{Array2, ArrayView2, Zip};
use rayon::slice::ParallelSliceMut;

use crate::{MlErr, Result};

/// The symmetrically normalized adjacency `D^-1/2 A D^-1/2` in CSR layout.
///
/// Rows are edge targets and columns are edge sources, so multiplying a
/// feature matrix by the operator moves signal along the edge direction.
/// Repeated edges add up. Nodes without incoming edges get a zero
/// normalization factor instead of an infinite one.
#[derive(Debug, Clone)]
pub struct DiffusionOperator {
    num_nodes: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f32>,
}

impl DiffusionOperator {
    /// Builds the operator from an edge list.
    ///
    /// # Arguments
    /// * `num_nodes` - The amount of nodes in the graph.
    /// * `edges` - `(source, target)` pairs.
    ///
    /// # Returns
    /// The operator or an error if an edge references a node out of range.
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut entries = Vec::with_capacity(edges.len());

        for (edge, &(src, dst)) in edges.iter().enumerate() {
            if let Some(node) = [src, dst].into_iter().find(|&n| n >= num_nodes) {
                return Err(MlErr::EdgeOutOfBounds {
                    edge,
                    node,
                    num_nodes,
                });
            }

            entries.push((dst, src));
        }

        entries.par_sort_unstable();

        let mut row_ptr = vec![0; num_nodes + 1];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values: Vec<f32> = Vec::with_capacity(entries.len());
        let mut degree = vec![0.0f32; num_nodes];
        let mut prev = None;

        for (row, col) in entries {
            degree[row] += 1.0;

            if prev == Some((row, col)) {
                if let Some(weight) = values.last_mut() {
                    *weight += 1.0;
                }
                continue;
            }

            row_ptr[row + 1] += 1;
            col_idx.push(col);
            values.push(1.0);
            prev = Some((row, col));
        }

        for row in 0..num_nodes {
            row_ptr[row + 1] += row_ptr[row];
        }

        let inv_sqrt: Vec<f32> = degree
            .iter()
            .map(|&d| if d > 0.0 { d.powf(-0.5) } else { 0.0 })
            .collect();

        for row in 0..num_nodes {
            for k in row_ptr[row]..row_ptr[row + 1] {
                values[k] *= inv_sqrt[row] * inv_sqrt[col_idx[k]];
            }
        }

        Ok(Self {
            num_nodes,
            row_ptr,
            col_idx,
            values,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the amount of stored (non-zero pattern) entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the normalized weight with which `source` contributes to `target`.
    pub fn weight(&self, target: usize, source: usize) -> f32 {
        if target >= self.num_nodes {
            return 0.0;
        }

        let range = self.row_ptr[target]..self.row_ptr[target + 1];
        self.col_idx[range.clone()]
            .binary_search(&source)
            .map_or(0.0, |k| self.values[range.start + k])
    }

    /// Multiplies the operator by a `[N, F]` feature matrix.
    ///
    /// Rows of the output are computed in parallel, each one accumulated in
    /// a fixed order, so the result does not depend on scheduling.
    ///
    /// # Arguments
    /// * `x` - The features to diffuse one hop.
    ///
    /// # Returns
    /// The diffused features or an error if `x` does not have one row per node.
    pub fn propagate(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.nrows() != self.num_nodes {
            return Err(MlErr::SizeMismatch {
                a: "features",
                b: "diffusion operator",
                got: x.nrows(),
                expected: self.num_nodes,
            });
        }

        let mut out = Array2::zeros((self.num_nodes, x.ncols()));

        Zip::indexed(out.rows_mut()).par_for_each(|row, mut out_row| {
            let range = self.row_ptr[row]..self.row_ptr[row + 1];
            let cols = &self.col_idx[range.clone()];
            let weights = &self.values[range];

            for (&col, &w) in cols.iter().zip(weights) {
                out_row.scaled_add(w, &x.row(col));
            }
        });

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn single_edge_flows_from_source_to_target() {
        // 0 -> 1, node 0 has no incoming edge so its factor is zero.
        let op = DiffusionOperator::from_edges(2, &[(0, 1)]).unwrap();
        let x = array![[1.0f32], [1.0]];

        let y = op.propagate(x.view()).unwrap();
        assert_eq!(y, array![[0.0], [0.0]]);
        assert_eq!(op.weight(1, 0), 0.0);
    }

    #[test]
    fn symmetric_pair_is_normalized_by_both_degrees() {
        let op = DiffusionOperator::from_edges(3, &[(0, 1), (1, 0), (1, 2), (2, 1)]).unwrap();

        // deg = [1, 2, 1]
        let expected = 1.0 / 2.0f32.sqrt();
        assert!((op.weight(0, 1) - expected).abs() < 1e-6);
        assert!((op.weight(1, 2) - expected).abs() < 1e-6);
        assert_eq!(op.weight(0, 2), 0.0);
        assert_eq!(op.nnz(), 4);
    }

    #[test]
    fn duplicate_edges_accumulate() {
        let op = DiffusionOperator::from_edges(2, &[(0, 1), (0, 1), (1, 0)]).unwrap();

        // deg = [1, 2], entry (1, 0) = 2 / sqrt(2 * 1)
        assert_eq!(op.nnz(), 2);
        assert!((op.weight(1, 0) - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn edge_out_of_range_is_rejected() {
        let err = DiffusionOperator::from_edges(2, &[(0, 2)]).unwrap_err();
        assert!(matches!(err, MlErr::EdgeOutOfBounds { node: 2, .. }));
    }

    #[test]
    fn feature_rows_must_match_nodes() {
        let op = DiffusionOperator::from_edges(3, &[]).unwrap();
        let x = Array2::<f32>::zeros((2, 4));

        assert!(matches!(
            op.propagate(x.view()),
            Err(MlErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }
}
