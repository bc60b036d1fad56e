use std::{num::NonZeroUsize, slice::Chunks};

use rand::{Rng, seq::SliceRandom};

/// Iterates a fixed set of node indices in mini batches.
///
/// The last batch keeps the remainder, so every node is visited exactly once
/// per pass.
#[derive(Debug, Clone)]
pub struct NodeLoader {
    nodes: Vec<usize>,
    batch_size: NonZeroUsize,
    shuffle: bool,
}

impl NodeLoader {
    /// Creates a new `NodeLoader`.
    ///
    /// # Arguments
    /// * `nodes` - The node indices to iterate.
    /// * `batch_size` - The maximum amount of nodes per batch.
    /// * `shuffle` - Whether the order is reshuffled on every pass.
    pub fn new(nodes: Vec<usize>, batch_size: NonZeroUsize, shuffle: bool) -> Self {
        Self {
            nodes,
            batch_size,
            shuffle,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn num_batches(&self) -> usize {
        self.nodes.len().div_ceil(self.batch_size.get())
    }

    /// Starts a new pass over the nodes.
    ///
    /// # Arguments
    /// * `rng` - The generator used to reshuffle, ignored without shuffling.
    ///
    /// # Returns
    /// The batches of this pass.
    pub fn batches<R: Rng>(&mut self, rng: &mut R) -> Chunks<'_, usize> {
        if self.shuffle {
            self.nodes.shuffle(rng);
        }

        self.nodes.chunks(self.batch_size.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn batch_size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn last_batch_keeps_the_remainder() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut loader = NodeLoader::new((0..7).collect(), batch_size(3), false);

        let batches: Vec<_> = loader.batches(&mut rng).map(<[usize]>::to_vec).collect();
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(loader.num_batches(), 3);
    }

    #[test]
    fn shuffled_pass_visits_every_node_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut loader = NodeLoader::new((0..50).collect(), batch_size(8), true);

        let mut seen: Vec<usize> = loader.batches(&mut rng).flatten().copied().collect();
        assert_ne!(seen, (0..50).collect::<Vec<_>>());

        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }
}
