//! End-to-end orchestration: preprocess → train → predict.
//!
//! The pipeline is the engine's sole external-facing contract. Callers
//! hand it a graph snapshot (papers + citations) and receive a ranked
//! list of predicted edges plus the final training loss. Phase and
//! epoch progress flow through a [`PipelineObserver`]; those events are
//! advisory and not part of the durable result.
//!
//! Execution is single-threaded and cooperative. The only suspension
//! point is the trainer's periodic yield, at which the observer's
//! cancellation signal is checked — there is no mid-epoch cancellation.
//! Observers are read-only with respect to engine-owned matrices.

use crate::error::{EnlazarError, Result};
use crate::gcn::GcnWeights;
use crate::graph::{Citation, CitationGraph, Paper};
use crate::predict::{predict_links, PredictedLink};
use crate::train::{StepOutcome, TrainOptions, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Observable pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Adjacency normalization and featurization.
    Preprocessing,
    /// The epoch loop.
    Training,
    /// Candidate scoring and ranking.
    Prediction,
}

/// Periodic training progress, reported at each yield point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Index of the last completed epoch (0-based).
    pub epoch: usize,
    /// Loss of that epoch.
    pub loss: f64,
    /// Total epochs configured for the run.
    pub total_epochs: usize,
}

/// Read-only observer of pipeline execution.
///
/// All methods have no-op defaults; implement only what you need.
/// `should_cancel` is polled at yield points only, so cancellation takes
/// effect between epochs, never inside one.
pub trait PipelineObserver {
    /// A phase is about to run.
    fn on_phase_start(&mut self, _phase: Phase) {}
    /// A phase finished successfully.
    fn on_phase_complete(&mut self, _phase: Phase) {}
    /// Periodic training progress (advisory).
    fn on_progress(&mut self, _progress: ProgressUpdate) {}
    /// A soft degradation occurred (e.g. negative-sampling shortfall).
    fn on_warning(&mut self, _warning: &EnlazarError) {}
    /// Polled at each yield point; return true to abort before the next
    /// epoch.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    /// All phases ran.
    Completed,
    /// The cancellation signal was honored at a yield point.
    Cancelled,
}

/// The durable result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Predicted edges, ordered by descending confidence.
    pub predictions: Vec<PredictedLink>,
    /// Loss of the last completed epoch; `None` if no epoch ran.
    pub final_loss: Option<f64>,
    /// Number of epochs that completed.
    pub epochs_run: usize,
    /// Completion status.
    pub status: PipelineStatus,
}

impl PipelineOutcome {
    fn empty() -> Self {
        Self {
            predictions: Vec::new(),
            final_loss: None,
            epochs_run: 0,
            status: PipelineStatus::Completed,
        }
    }
}

/// Pipeline configuration. All knobs are optional with the builder
/// defaults below; the confidence threshold is fixed at 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// First-layer width. Default 32.
    pub hidden_dim: usize,
    /// Embedding width. Default 16.
    pub embedding_dim: usize,
    /// Epoch count. Default 100.
    pub epochs: usize,
    /// Gradient-descent learning rate. Default 0.01.
    pub learning_rate: f64,
    /// Epochs between yield points. Default 10.
    pub yield_every: usize,
    /// Maximum predictions returned. Default 20.
    pub top_k: usize,
    /// Seed for weight initialization and negative sampling. `None`
    /// draws from entropy; set it for reproducible runs.
    pub random_state: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hidden_dim: 32,
            embedding_dim: 16,
            epochs: 100,
            learning_rate: 0.01,
            yield_every: 10,
            top_k: 20,
            random_state: None,
        }
    }
}

impl PipelineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hidden layer width.
    #[must_use]
    pub fn with_hidden_dim(mut self, hidden_dim: usize) -> Self {
        self.hidden_dim = hidden_dim;
        self
    }

    /// Sets the embedding width.
    #[must_use]
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Sets the epoch count.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the yield interval in epochs.
    #[must_use]
    pub fn with_yield_every(mut self, yield_every: usize) -> Self {
        self.yield_every = yield_every;
        self
    }

    /// Sets the maximum number of predictions returned.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.hidden_dim == 0 {
            return Err(EnlazarError::InvalidHyperparameter {
                param: "hidden_dim".to_string(),
                value: "0".to_string(),
                constraint: "hidden_dim >= 1".to_string(),
            });
        }
        if self.embedding_dim == 0 {
            return Err(EnlazarError::InvalidHyperparameter {
                param: "embedding_dim".to_string(),
                value: "0".to_string(),
                constraint: "embedding_dim >= 1".to_string(),
            });
        }
        self.train_options().validate()
    }

    fn train_options(&self) -> TrainOptions {
        TrainOptions {
            epochs: self.epochs,
            learning_rate: self.learning_rate,
            yield_every: self.yield_every,
        }
    }
}

/// Sequences preprocessing, training, and prediction over one graph
/// snapshot. Each run owns its matrices exclusively; nothing is shared
/// across runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EnlazarError::InvalidHyperparameter`] for degenerate
    /// dimensions, epoch counts, or learning rates.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline with fresh Xavier-initialized weights.
    ///
    /// An empty graph (zero nodes or zero trainable edges) is a valid
    /// input: the run completes with zero predictions.
    ///
    /// # Errors
    ///
    /// Returns [`EnlazarError::NumericalInstability`] if training blows
    /// up, or [`EnlazarError::ShapeMismatch`] for internal shape bugs.
    /// Failures abort the remaining phases; nothing is retried.
    pub fn run(
        &self,
        papers: &[Paper],
        citations: &[Citation],
        observer: &mut impl PipelineObserver,
    ) -> Result<PipelineOutcome> {
        self.run_inner(papers, citations, None, observer)
    }

    /// Runs the full pipeline resuming from previously trained weights.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Pipeline::run`]; additionally fails with
    /// [`EnlazarError::ShapeMismatch`] if the supplied weights do not
    /// match the configured dimensions.
    pub fn run_with_weights(
        &self,
        papers: &[Paper],
        citations: &[Citation],
        weights: GcnWeights,
        observer: &mut impl PipelineObserver,
    ) -> Result<PipelineOutcome> {
        self.run_inner(papers, citations, Some(weights), observer)
    }

    fn run_inner(
        &self,
        papers: &[Paper],
        citations: &[Citation],
        weights: Option<GcnWeights>,
        observer: &mut impl PipelineObserver,
    ) -> Result<PipelineOutcome> {
        observer.on_phase_start(Phase::Preprocessing);
        let graph = CitationGraph::build(papers, citations);
        observer.on_phase_complete(Phase::Preprocessing);

        let mut rng = match self.config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        observer.on_phase_start(Phase::Training);
        let trainer = match weights {
            Some(w) => Trainer::with_weights(&graph, self.config.train_options(), w, &mut rng),
            None => Trainer::new(
                &graph,
                self.config.train_options(),
                self.config.hidden_dim,
                self.config.embedding_dim,
                &mut rng,
            ),
        };
        let mut trainer = match trainer {
            Ok(trainer) => trainer,
            // No nodes or no trainable edges: "no predictions possible"
            // is a valid outcome, not a failure.
            Err(EnlazarError::EmptyGraph { .. }) => return Ok(PipelineOutcome::empty()),
            Err(other) => return Err(other),
        };

        if trainer.negative_shortfall() > 0 {
            observer.on_warning(&EnlazarError::NegativeSampleExhaustion {
                requested: trainer.negatives_drawn() + trainer.negative_shortfall(),
                drawn: trainer.negatives_drawn(),
            });
        }

        let final_loss = loop {
            match trainer.step()? {
                StepOutcome::Yielded { epoch, loss } => {
                    observer.on_progress(ProgressUpdate {
                        epoch,
                        loss,
                        total_epochs: self.config.epochs,
                    });
                    if observer.should_cancel() {
                        return Ok(PipelineOutcome {
                            predictions: Vec::new(),
                            final_loss: Some(loss),
                            epochs_run: epoch + 1,
                            status: PipelineStatus::Cancelled,
                        });
                    }
                }
                StepOutcome::Finished { loss } => {
                    observer.on_progress(ProgressUpdate {
                        epoch: self.config.epochs - 1,
                        loss,
                        total_epochs: self.config.epochs,
                    });
                    break loss;
                }
            }
        };
        observer.on_phase_complete(Phase::Training);

        observer.on_phase_start(Phase::Prediction);
        let embeddings = trainer
            .embeddings()
            .expect("trainer converged before prediction phase");
        let predictions = predict_links(embeddings, &graph, self.config.top_k)?;
        observer.on_phase_complete(Phase::Prediction);

        Ok(PipelineOutcome {
            predictions,
            final_loss: Some(final_loss),
            epochs_run: self.config.epochs,
            status: PipelineStatus::Completed,
        })
    }
}
