//! Two-layer graph-convolutional forward pass.
//!
//! ```text
//! Z1 = ReLU(Â · X · W1)     first convolution + non-linearity
//! H  = Â · Z1 · W2          second convolution, linear
//! ```
//!
//! The embedding layer carries no activation: dot-product similarity over
//! embeddings benefits from unconstrained output. The forward pass is a
//! pure function; it retains every intermediate the trainer needs for
//! manual backpropagation.

use crate::error::Result;
use crate::primitives::{xavier_normal, Matrix};
use rand::rngs::StdRng;

/// Learned parameters of the two convolution layers.
///
/// Shapes: `w1` is feature_dim×hidden_dim, `w2` is hidden_dim×embedding_dim.
/// Owned by the trainer during a run; recoverable afterward for resuming.
#[derive(Debug, Clone, PartialEq)]
pub struct GcnWeights {
    /// First-layer transform (feature_dim × hidden_dim).
    pub w1: Matrix,
    /// Second-layer transform (hidden_dim × embedding_dim).
    pub w2: Matrix,
}

impl GcnWeights {
    /// Xavier/Glorot-initialized weights, reproducible given a seeded rng.
    #[must_use]
    pub fn xavier(
        feature_dim: usize,
        hidden_dim: usize,
        embedding_dim: usize,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            w1: xavier_normal(feature_dim, hidden_dim, rng),
            w2: xavier_normal(hidden_dim, embedding_dim, rng),
        }
    }

    /// All-zero weights (used by tests to pin down the forward pass).
    #[must_use]
    pub fn zeros(feature_dim: usize, hidden_dim: usize, embedding_dim: usize) -> Self {
        Self {
            w1: Matrix::zeros(feature_dim, hidden_dim),
            w2: Matrix::zeros(hidden_dim, embedding_dim),
        }
    }

    /// Hidden width (columns of W1).
    #[must_use]
    pub fn hidden_dim(&self) -> usize {
        self.w1.n_cols()
    }

    /// Embedding width (columns of W2).
    #[must_use]
    pub fn embedding_dim(&self) -> usize {
        self.w2.n_cols()
    }
}

/// Everything the forward pass computes, including the intermediates the
/// backward pass reuses.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    /// X · W1, before propagation through Â.
    pub xw1: Matrix,
    /// Â · X · W1, the first layer's pre-activation.
    pub pre_activation: Matrix,
    /// ReLU of the pre-activation (first-layer output).
    pub z1: Matrix,
    /// Final node embeddings Â · Z1 · W2.
    pub embeddings: Matrix,
}

/// Runs the two-layer forward pass.
///
/// # Errors
///
/// Returns [`crate::error::EnlazarError::ShapeMismatch`] if the operand
/// shapes are incompatible.
pub fn forward(a_hat: &Matrix, x: &Matrix, weights: &GcnWeights) -> Result<ForwardPass> {
    let xw1 = x.matmul(&weights.w1)?;
    let pre_activation = a_hat.matmul(&xw1)?;
    let z1 = pre_activation.relu();
    let embeddings = a_hat.matmul(&z1.matmul(&weights.w2)?)?;

    Ok(ForwardPass {
        xw1,
        pre_activation,
        z1,
        embeddings,
    })
}
