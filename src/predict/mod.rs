//! Candidate-edge scoring and ranking from trained embeddings.
//!
//! Scores every non-adjacent unordered node pair by the sigmoid of its
//! embedding dot product, keeps candidates above the confidence
//! threshold, and returns the top-K by descending confidence. Pair
//! enumeration is O(n²) by design; the engine targets graphs small
//! enough for dense adjacency operations.

use crate::error::{EnlazarError, Result};
use crate::graph::CitationGraph;
use crate::primitives::{sigmoid, Matrix};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum confidence for a candidate edge to be reported.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// A scored candidate edge, ordered by descending confidence in predictor
/// output. Produced only; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedLink {
    /// Paper id of one endpoint.
    pub source: String,
    /// Paper id of the other endpoint.
    pub target: String,
    /// Edge probability in [0, 1].
    pub confidence: f64,
}

/// Scores all non-adjacent pairs and returns at most `top_k` predictions
/// above [`CONFIDENCE_THRESHOLD`], sorted by descending confidence.
///
/// Never returns a pair that exists as an edge in either direction.
///
/// # Errors
///
/// Returns [`EnlazarError::ShapeMismatch`] if the embedding matrix does
/// not have one row per graph node.
pub fn predict_links(
    embeddings: &Matrix,
    graph: &CitationGraph,
    top_k: usize,
) -> Result<Vec<PredictedLink>> {
    let n = graph.n_nodes();
    if embeddings.n_rows() != n {
        return Err(EnlazarError::ShapeMismatch {
            expected: format!("{n}x{} embeddings", embeddings.n_cols()),
            actual: format!("{}x{}", embeddings.n_rows(), embeddings.n_cols()),
        });
    }

    let mut candidates = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if graph.has_edge(i, j) {
                continue;
            }
            let confidence = sigmoid(embeddings.row(i).dot(&embeddings.row(j)));
            if confidence > CONFIDENCE_THRESHOLD {
                candidates.push(PredictedLink {
                    source: graph.id(i).to_string(),
                    target: graph.id(j).to_string(),
                    confidence,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(top_k);
    Ok(candidates)
}
