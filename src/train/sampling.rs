//! Negative-edge sampling for the unsupervised link-prediction objective.

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

/// Attempt budget, as a multiple of the requested count. When the budget
/// runs out the set is simply shorter; sampling never blocks indefinitely.
const RETRY_BUDGET_FACTOR: usize = 10;

/// The drawn negative set, possibly shorter than requested.
#[derive(Debug, Clone)]
pub struct NegativeEdges {
    /// Drawn non-edges, normalized to (min, max) index order.
    pub pairs: Vec<(usize, usize)>,
    /// Number of negatives that were requested.
    pub requested: usize,
}

impl NegativeEdges {
    /// How many requested negatives could not be drawn.
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.requested - self.pairs.len()
    }
}

/// Draws up to `target` distinct node pairs (i, j), i ≠ j, that are not in
/// `edge_set`, by rejection sampling with a bounded retry budget.
///
/// Drawn once before training begins; the same set is reused every epoch.
pub fn sample_negative_edges(
    n_nodes: usize,
    edge_set: &HashSet<(usize, usize)>,
    target: usize,
    rng: &mut StdRng,
) -> NegativeEdges {
    let mut pairs = Vec::with_capacity(target);

    if n_nodes >= 2 {
        let mut drawn: HashSet<(usize, usize)> = HashSet::with_capacity(target);
        let budget = target.saturating_mul(RETRY_BUDGET_FACTOR);

        for _ in 0..budget {
            if pairs.len() == target {
                break;
            }
            let i = rng.gen_range(0..n_nodes);
            let j = rng.gen_range(0..n_nodes);
            if i == j {
                continue;
            }
            let pair = (i.min(j), i.max(j));
            if edge_set.contains(&pair) || !drawn.insert(pair) {
                continue;
            }
            pairs.push(pair);
        }
    }

    NegativeEdges {
        pairs,
        requested: target,
    }
}
