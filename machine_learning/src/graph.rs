use std::{fs, path::Path};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// One of the three node subsets a graph is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

/// Boolean node masks, one entry per node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Masks {
    pub train: Vec<bool>,
    pub val: Vec<bool>,
    pub test: Vec<bool>,
}

impl Masks {
    pub fn get(&self, split: Split) -> &[bool] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }
}

/// The on-disk description of a node-classification graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSpec {
    pub num_nodes: usize,
    pub num_classes: usize,
    pub features: Vec<Vec<f32>>,
    pub edges: Vec<(usize, usize)>,
    pub labels: Vec<usize>,
    #[serde(flatten)]
    pub masks: Masks,
}

/// A validated node-classification graph.
///
/// Every mask and the label vector hold exactly one entry per node, and every
/// edge endpoint is a valid node index. The train and val masks select at
/// least one node each.
#[derive(Debug, Clone)]
pub struct Graph {
    features: Array2<f32>,
    edges: Vec<(usize, usize)>,
    labels: Vec<usize>,
    num_classes: usize,
    masks: Masks,
}

impl Graph {
    /// Creates a new `Graph` after checking its invariants.
    ///
    /// # Arguments
    /// * `features` - The `[N, F]` node feature matrix.
    /// * `edges` - `(source, target)` pairs.
    /// * `labels` - One class per node.
    /// * `num_classes` - The amount of classes.
    /// * `masks` - The train, val and test node masks.
    ///
    /// # Returns
    /// The graph, or the first violated invariant.
    pub fn new(
        features: Array2<f32>,
        edges: Vec<(usize, usize)>,
        labels: Vec<usize>,
        num_classes: usize,
        masks: Masks,
    ) -> Result<Self> {
        let num_nodes = features.nrows();

        if num_classes == 0 {
            return Err(MlErr::NoClasses);
        }

        check_len("labels", labels.len(), num_nodes)?;
        check_len("train mask", masks.train.len(), num_nodes)?;
        check_len("val mask", masks.val.len(), num_nodes)?;
        check_len("test mask", masks.test.len(), num_nodes)?;

        for split in [Split::Train, Split::Val] {
            if !masks.get(split).contains(&true) {
                return Err(MlErr::EmptySplit(split.name()));
            }
        }

        for (edge, &(src, dst)) in edges.iter().enumerate() {
            if let Some(node) = [src, dst].into_iter().find(|&n| n >= num_nodes) {
                return Err(MlErr::EdgeOutOfBounds {
                    edge,
                    node,
                    num_nodes,
                });
            }
        }

        if let Some((node, &label)) = labels.iter().enumerate().find(|(_, l)| **l >= num_classes) {
            return Err(MlErr::LabelOutOfBounds {
                node,
                label,
                num_classes,
            });
        }

        Ok(Self {
            features,
            edges,
            labels,
            num_classes,
            masks,
        })
    }

    /// Builds a graph from its descriptor.
    pub fn from_spec(spec: GraphSpec) -> Result<Self> {
        let GraphSpec {
            num_nodes,
            num_classes,
            features,
            edges,
            labels,
            masks,
        } = spec;

        check_len("features", features.len(), num_nodes)?;
        let num_features = features.first().map_or(0, Vec::len);

        let mut flat = Vec::with_capacity(num_nodes * num_features);
        for row in &features {
            check_len("feature row", row.len(), num_features)?;
            flat.extend_from_slice(row);
        }

        let features = Array2::from_shape_vec((num_nodes, num_features), flat)?;
        Self::new(features, edges, labels, num_classes, masks)
    }

    /// Reads and validates a JSON graph descriptor.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let spec: GraphSpec = serde_json::from_str(&content)?;
        Self::from_spec(spec)
    }

    pub fn num_nodes(&self) -> usize {
        self.features.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn mask(&self, split: Split) -> &[bool] {
        self.masks.get(split)
    }

    /// Returns the indices of the nodes selected by a split's mask, in order.
    pub fn nodes(&self, split: Split) -> Vec<usize> {
        self.mask(split)
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect()
    }
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            a: what,
            b: "nodes",
            got,
            expected,
        });
    }

    Ok(())
}
