//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use enlazar::prelude::*;
//! ```

pub use crate::error::{EnlazarError, Result};
pub use crate::gcn::GcnWeights;
pub use crate::graph::{Citation, CitationGraph, Paper};
pub use crate::pipeline::{
    NullObserver, Phase, Pipeline, PipelineConfig, PipelineObserver, PipelineOutcome,
    PipelineStatus, ProgressUpdate,
};
pub use crate::predict::PredictedLink;
pub use crate::primitives::{Matrix, Vector};
pub use crate::train::{StepOutcome, TrainOptions, Trainer, TrainerState};
