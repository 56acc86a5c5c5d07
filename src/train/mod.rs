//! Epoch-driven GCN trainer with manual backpropagation.
//!
//! The trainer owns the weight matrices for the duration of a run and
//! drives the unsupervised link-prediction objective: real edges are
//! positive examples, sampled non-edges are negatives, and binary
//! cross-entropy over sigmoid-squashed embedding dot products scores both.
//!
//! Gradients are derived analytically rather than through an autodiff
//! tape; the forward pass retains its intermediates as named values and
//! the chain rule runs through:
//!
//! ```text
//! H = Â·Z1·W2   ⇒   dW2 = Z1ᵀ·Âᵀ·dH
//!                   dZ1 = (Âᵀ·dH)·W2ᵀ ∘ reluGrad(preAct1)
//!                   dW1 = Xᵀ·(Âᵀ·dZ1)
//! ```
//!
//! Execution is cooperative: [`Trainer::step`] runs a bounded number of
//! epochs and hands control back to the host, which is the engine's sole
//! suspension point. Epochs are strictly sequential; no epoch begins
//! before the previous weight update completes.

mod sampling;

pub use sampling::{sample_negative_edges, NegativeEdges};

use crate::error::{EnlazarError, Result};
use crate::gcn::{forward, GcnWeights};
use crate::graph::CitationGraph;
use crate::primitives::{sigmoid, Matrix};
use rand::rngs::StdRng;

/// Floor added inside the BCE logarithms so a saturated sigmoid can never
/// produce ln(0).
const BCE_EPSILON: f64 = 1e-15;

/// Trainer lifecycle. A failed epoch is fatal; there is no retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// No epoch has run yet.
    Uninitialized,
    /// Mid-run; `epoch` is the next epoch to execute.
    Training {
        /// Next epoch index (0-based).
        epoch: usize,
    },
    /// All epochs completed and final embeddings produced.
    Converged,
}

/// What a call to [`Trainer::step`] produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The yield interval elapsed; training is suspended, call `step` again.
    Yielded {
        /// Index of the last completed epoch.
        epoch: usize,
        /// Loss of that epoch.
        loss: f64,
    },
    /// All epochs completed.
    Finished {
        /// Loss of the final epoch.
        loss: f64,
    },
}

/// Hyperparameters for a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    /// Total number of epochs.
    pub epochs: usize,
    /// Fixed scalar learning rate for gradient descent.
    pub learning_rate: f64,
    /// Number of epochs to run between suspension points.
    pub yield_every: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.01,
            yield_every: 10,
        }
    }
}

impl TrainOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(EnlazarError::InvalidHyperparameter {
                param: "epochs".to_string(),
                value: "0".to_string(),
                constraint: "epochs >= 1".to_string(),
            });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(EnlazarError::InvalidHyperparameter {
                param: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                constraint: "finite and > 0".to_string(),
            });
        }
        if self.yield_every == 0 {
            return Err(EnlazarError::InvalidHyperparameter {
                param: "yield_every".to_string(),
                value: "0".to_string(),
                constraint: "yield_every >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Resumable epoch loop over a preprocessed citation graph.
#[derive(Debug)]
pub struct Trainer {
    a_hat: Matrix,
    a_hat_t: Matrix,
    x: Matrix,
    x_t: Matrix,
    weights: GcnWeights,
    positives: Vec<(usize, usize)>,
    negatives: NegativeEdges,
    options: TrainOptions,
    state: TrainerState,
    loss_history: Vec<f64>,
    embeddings: Option<Matrix>,
}

impl Trainer {
    /// Creates a trainer with caller-supplied weights (e.g. to resume a
    /// previous run). Negative edges are drawn once, here.
    ///
    /// # Errors
    ///
    /// Returns [`EnlazarError::EmptyGraph`] if the graph has no nodes or
    /// no trainable edges, or [`EnlazarError::InvalidHyperparameter`] for
    /// degenerate options.
    pub fn with_weights(
        graph: &CitationGraph,
        options: TrainOptions,
        weights: GcnWeights,
        rng: &mut StdRng,
    ) -> Result<Self> {
        options.validate()?;
        if graph.is_empty() {
            return Err(EnlazarError::EmptyGraph {
                nodes: graph.n_nodes(),
                edges: graph.n_edges(),
            });
        }

        let positives = graph.positive_edges().to_vec();
        let edge_set = positives.iter().copied().collect();
        let negatives =
            sampling::sample_negative_edges(graph.n_nodes(), &edge_set, positives.len(), rng);

        let a_hat = graph.a_hat().clone();
        let x = graph.features().clone();

        Ok(Self {
            a_hat_t: a_hat.transpose(),
            x_t: x.transpose(),
            a_hat,
            x,
            weights,
            positives,
            negatives,
            options,
            state: TrainerState::Uninitialized,
            loss_history: Vec::new(),
            embeddings: None,
        })
    }

    /// Creates a trainer with fresh Xavier-initialized weights.
    ///
    /// The same generator seeds both the weight initialization and the
    /// negative sampling, so a fixed seed makes the whole run reproducible.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Trainer::with_weights`].
    pub fn new(
        graph: &CitationGraph,
        options: TrainOptions,
        hidden_dim: usize,
        embedding_dim: usize,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let weights = GcnWeights::xavier(
            graph.features().n_cols(),
            hidden_dim,
            embedding_dim,
            rng,
        );
        Self::with_weights(graph, options, weights, rng)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Per-epoch losses recorded so far.
    #[must_use]
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    /// How many requested negatives could not be drawn.
    #[must_use]
    pub fn negative_shortfall(&self) -> usize {
        self.negatives.shortfall()
    }

    /// Number of negatives actually drawn.
    #[must_use]
    pub fn negatives_drawn(&self) -> usize {
        self.negatives.pairs.len()
    }

    /// Final embeddings, available once the trainer has converged.
    #[must_use]
    pub fn embeddings(&self) -> Option<&Matrix> {
        self.embeddings.as_ref()
    }

    /// Current weights.
    #[must_use]
    pub fn weights(&self) -> &GcnWeights {
        &self.weights
    }

    /// Consumes the trainer, returning the weights for a later resume.
    #[must_use]
    pub fn into_weights(self) -> GcnWeights {
        self.weights
    }

    /// Runs up to `yield_every` epochs, then suspends.
    ///
    /// Returns [`StepOutcome::Yielded`] while epochs remain and
    /// [`StepOutcome::Finished`] once the final epoch's update has been
    /// applied and the final forward pass taken. Calling `step` on a
    /// converged trainer returns `Finished` again without running anything.
    ///
    /// # Errors
    ///
    /// Returns [`EnlazarError::NumericalInstability`] if an epoch produces
    /// a non-finite forward pass or loss; the trainer is then unusable for
    /// further steps.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let mut epoch = match self.state {
            TrainerState::Uninitialized => 0,
            TrainerState::Training { epoch } => epoch,
            TrainerState::Converged => {
                let loss = self.loss_history.last().copied().unwrap_or(f64::NAN);
                return Ok(StepOutcome::Finished { loss });
            }
        };

        let mut loss = f64::NAN;
        for _ in 0..self.options.yield_every {
            loss = self.run_epoch(epoch)?;
            epoch += 1;
            if epoch == self.options.epochs {
                let fwd = forward(&self.a_hat, &self.x, &self.weights)?;
                // The final epoch's update has no successor epoch to
                // validate it, so the published forward pass is checked
                // here for the overflow the loss check would have caught.
                if !(fwd.pre_activation.all_finite() && fwd.embeddings.all_finite()) {
                    return Err(self.instability(epoch - 1));
                }
                self.embeddings = Some(fwd.embeddings);
                self.state = TrainerState::Converged;
                return Ok(StepOutcome::Finished { loss });
            }
        }

        self.state = TrainerState::Training { epoch };
        Ok(StepOutcome::Yielded {
            epoch: epoch - 1,
            loss,
        })
    }

    /// Drives [`Trainer::step`] to completion without yielding to a host.
    ///
    /// # Errors
    ///
    /// Propagates any epoch failure.
    pub fn run(&mut self) -> Result<f64> {
        loop {
            if let StepOutcome::Finished { loss } = self.step()? {
                return Ok(loss);
            }
        }
    }

    /// One full epoch: forward, loss/gradient accumulation, backward,
    /// gradient-descent update. Returns the epoch's (finite) loss.
    fn run_epoch(&mut self, epoch: usize) -> Result<f64> {
        let fwd = forward(&self.a_hat, &self.x, &self.weights)?;
        // ReLU maps NaN to 0 (`f64::max`), so a non-finite first layer
        // would otherwise collapse into all-zero embeddings and a
        // plausible-looking ln(2) loss. Fail before the mask applies.
        if !fwd.pre_activation.all_finite() {
            return Err(self.instability(epoch));
        }
        let h = &fwd.embeddings;
        let embedding_dim = h.n_cols();
        let n = h.n_rows();

        let mut grad_h = Matrix::zeros(n, embedding_dim);
        let mut loss = 0.0;

        // Positives: target label 1, gradient coefficient (p − 1).
        for &(i, j) in &self.positives {
            let score = h.row(i).dot(&h.row(j));
            let p = sigmoid(score);
            loss += -(p + BCE_EPSILON).ln();
            let coeff = p - 1.0;
            for k in 0..embedding_dim {
                grad_h.set(i, k, grad_h.get(i, k) + coeff * h.get(j, k));
                grad_h.set(j, k, grad_h.get(j, k) + coeff * h.get(i, k));
            }
        }

        // Negatives: target label 0, gradient coefficient p.
        for &(i, j) in &self.negatives.pairs {
            let score = h.row(i).dot(&h.row(j));
            let p = sigmoid(score);
            loss += -(1.0 - p + BCE_EPSILON).ln();
            for k in 0..embedding_dim {
                grad_h.set(i, k, grad_h.get(i, k) + p * h.get(j, k));
                grad_h.set(j, k, grad_h.get(j, k) + p * h.get(i, k));
            }
        }

        let count = (self.positives.len() + self.negatives.pairs.len()) as f64;
        loss /= count;
        let grad_h = grad_h.mul_scalar(1.0 / count);

        if !loss.is_finite() {
            return Err(self.instability(epoch));
        }

        // Backward through H = Â·Z1·W2, then Z1 = ReLU(Â·X·W1).
        let upstream = self.a_hat_t.matmul(&grad_h)?;
        let d_w2 = fwd.z1.transpose().matmul(&upstream)?;
        let d_z1 = upstream
            .matmul(&self.weights.w2.transpose())?
            .hadamard(&fwd.pre_activation.relu_gradient())?;
        let d_w1 = self.x_t.matmul(&self.a_hat_t.matmul(&d_z1)?)?;

        self.weights.w1 = self
            .weights
            .w1
            .sub(&d_w1.mul_scalar(self.options.learning_rate))?;
        self.weights.w2 = self
            .weights
            .w2
            .sub(&d_w2.mul_scalar(self.options.learning_rate))?;

        self.loss_history.push(loss);
        Ok(loss)
    }

    /// Instability error carrying the most recent finite loss, if any.
    fn instability(&self, epoch: usize) -> EnlazarError {
        EnlazarError::NumericalInstability {
            epoch,
            last_loss: self.loss_history.last().copied().unwrap_or(f64::NAN),
        }
    }
}

#[cfg(test)]
mod tests;
