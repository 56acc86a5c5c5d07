//! Citation-graph preprocessing: adjacency normalization and featurization.
//!
//! Turns raw paper/citation lists into the dense operators the GCN engine
//! consumes:
//!
//! ```text
//! Papers + Citations
//!        │
//!        ▼
//! ┌─────────────────────────────┐
//! │      CitationGraph          │
//! │  Â  (normalized adjacency)  │
//! │  X  (node feature matrix)   │
//! │  id ↔ index bijection       │
//! └─────────────────────────────┘
//! ```
//!
//! Â follows the GCN renormalization trick (Kipf & Welling, 2017): raw
//! adjacency with self-loops, then symmetric degree normalization
//! Â[i][j] = A[i][j] / (√dᵢ·√dⱼ). Every row mixes neighbor and self
//! features with bounded spectral radius, which keeps propagation stable.
//!
//! Citations flagged as prior predictions are excluded up front, so the
//! model never trains on its own earlier output.

use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Number of features per node in the feature matrix.
pub const FEATURE_DIM: usize = 8;

/// Divisor applied to log-scaled citation counts.
const CITATION_LOG_DIVISOR: f64 = 4.0;

/// Degree at which the normalized-degree feature saturates.
const DEGREE_SATURATION: f64 = 10.0;

/// Citation-count tier boundaries for the one-hot tier feature.
const TIER_THRESHOLDS: [u32; 3] = [10, 100, 1000];

/// A paper in the citation graph. Immutable input; never mutated by the
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Unique identifier.
    pub id: String,
    /// Publication year, if known.
    pub year: Option<i32>,
    /// Total citation count.
    pub citation_count: u32,
    /// Whether the paper ships a companion artifact (code, data).
    pub has_artifact: bool,
}

/// A citation edge between two papers (unordered).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Id of one endpoint.
    pub source: String,
    /// Id of the other endpoint.
    pub target: String,
    /// True if this edge was itself produced by a prior prediction run.
    /// Predicted edges are excluded from graph construction.
    pub predicted: bool,
}

/// Preprocessed graph: normalized adjacency, features, and the id↔index
/// bijection. Built once per pipeline run; read-only afterward.
#[derive(Debug, Clone)]
pub struct CitationGraph {
    a_hat: Matrix,
    features: Matrix,
    index_to_id: Vec<String>,
    id_to_index: HashMap<String, usize>,
    /// Unique trainable edges, normalized to (min, max) index order.
    positive_edges: Vec<(usize, usize)>,
    edge_set: HashSet<(usize, usize)>,
}

impl CitationGraph {
    /// Builds the graph operators from raw paper and citation lists.
    ///
    /// Citations with `predicted == true`, unknown endpoints, or equal
    /// endpoints are skipped; duplicates are collapsed. The result may be
    /// structurally empty (zero nodes or zero trainable edges) — callers
    /// that require a trainable graph check [`CitationGraph::is_empty`].
    #[must_use]
    pub fn build(papers: &[Paper], citations: &[Citation]) -> Self {
        let n = papers.len();

        let index_to_id: Vec<String> = papers.iter().map(|p| p.id.clone()).collect();
        let id_to_index: HashMap<String, usize> = index_to_id
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut edge_set: HashSet<(usize, usize)> = HashSet::new();
        let mut positive_edges: Vec<(usize, usize)> = Vec::new();
        for citation in citations {
            if citation.predicted {
                continue;
            }
            let (Some(&i), Some(&j)) = (
                id_to_index.get(&citation.source),
                id_to_index.get(&citation.target),
            ) else {
                continue;
            };
            if i == j {
                continue;
            }
            let pair = (i.min(j), i.max(j));
            if edge_set.insert(pair) {
                positive_edges.push(pair);
            }
        }

        let a_hat = normalized_adjacency(n, &positive_edges);
        let features = feature_matrix(papers, &positive_edges);

        Self {
            a_hat,
            features,
            index_to_id,
            id_to_index,
            positive_edges,
            edge_set,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.index_to_id.len()
    }

    /// Number of unique trainable edges.
    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.positive_edges.len()
    }

    /// True if the graph has no nodes or no trainable edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_nodes() == 0 || self.positive_edges.is_empty()
    }

    /// The symmetric, self-loop-augmented, degree-normalized adjacency Â.
    #[must_use]
    pub fn a_hat(&self) -> &Matrix {
        &self.a_hat
    }

    /// The n×8 node feature matrix X.
    #[must_use]
    pub fn features(&self) -> &Matrix {
        &self.features
    }

    /// Unique trainable edges as (min, max) index pairs.
    #[must_use]
    pub fn positive_edges(&self) -> &[(usize, usize)] {
        &self.positive_edges
    }

    /// True if (i, j) is an edge in either direction.
    #[must_use]
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.edge_set.contains(&(i.min(j), i.max(j)))
    }

    /// Paper id for a node index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn id(&self, index: usize) -> &str {
        &self.index_to_id[index]
    }

    /// Node index for a paper id, if present.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }
}

/// Builds Â: raw adjacency with self-loops, symmetrically normalized by
/// degree. A zero raw degree maps to a normalization factor of 0 rather
/// than dividing by zero (unreachable while self-loops are present, but
/// the guard keeps the arithmetic total).
fn normalized_adjacency(n: usize, edges: &[(usize, usize)]) -> Matrix {
    let mut raw = Matrix::zeros(n, n);
    for i in 0..n {
        raw.set(i, i, 1.0);
    }
    for &(i, j) in edges {
        raw.set(i, j, 1.0);
        raw.set(j, i, 1.0);
    }

    let inv_sqrt_degree: Vec<f64> = (0..n)
        .map(|i| {
            let degree: f64 = (0..n).map(|j| raw.get(i, j)).sum();
            if degree > 0.0 {
                1.0 / degree.sqrt()
            } else {
                0.0
            }
        })
        .collect();

    let mut a_hat = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            a_hat.set(i, j, raw.get(i, j) * inv_sqrt_degree[i] * inv_sqrt_degree[j]);
        }
    }
    a_hat
}

/// Builds the n×8 feature matrix. Deterministic given the paper list;
/// a missing attribute maps to its neutral default (0, tier 0).
///
/// Columns: log-scaled citation count, min-max year, artifact flag,
/// clipped-normalized degree, 4-way one-hot citation tier.
fn feature_matrix(papers: &[Paper], edges: &[(usize, usize)]) -> Matrix {
    let n = papers.len();

    let mut degrees = vec![0usize; n];
    for &(i, j) in edges {
        degrees[i] += 1;
        degrees[j] += 1;
    }

    let years: Vec<i32> = papers.iter().filter_map(|p| p.year).collect();
    let year_min = years.iter().copied().min();
    let year_max = years.iter().copied().max();

    let mut x = Matrix::zeros(n, FEATURE_DIM);
    for (i, paper) in papers.iter().enumerate() {
        let log_citations =
            (f64::from(paper.citation_count) + 1.0).log10() / CITATION_LOG_DIVISOR;
        x.set(i, 0, log_citations);

        let year_norm = match (paper.year, year_min, year_max) {
            (Some(y), Some(lo), Some(hi)) if hi > lo => {
                f64::from(y - lo) / f64::from(hi - lo)
            }
            _ => 0.0,
        };
        x.set(i, 1, year_norm);

        x.set(i, 2, if paper.has_artifact { 1.0 } else { 0.0 });

        let degree_norm = (degrees[i] as f64 / DEGREE_SATURATION).min(1.0);
        x.set(i, 3, degree_norm);

        let tier = TIER_THRESHOLDS
            .iter()
            .position(|&t| paper.citation_count < t)
            .unwrap_or(TIER_THRESHOLDS.len());
        x.set(i, 4 + tier, 1.0);
    }
    x
}
