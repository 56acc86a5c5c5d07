//! Error types for Enlazar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Enlazar operations.
///
/// Provides detailed context about failures including dimension mismatches,
/// degenerate graphs, numerical blow-ups during training, and invalid
/// hyperparameters.
///
/// # Examples
///
/// ```
/// use enlazar::error::EnlazarError;
///
/// let err = EnlazarError::ShapeMismatch {
///     expected: "4x8".to_string(),
///     actual: "4x3".to_string(),
/// };
/// assert!(err.to_string().contains("shape mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum EnlazarError {
    /// Matrix operands have incompatible dimensions for the operation.
    ShapeMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// The input graph has no nodes or no trainable edges.
    ///
    /// This is a valid outcome for the pipeline (no predictions possible),
    /// not a fatal condition; the orchestrator maps it to an empty result.
    EmptyGraph {
        /// Number of nodes in the input
        nodes: usize,
        /// Number of non-predicted edges in the input
        edges: usize,
    },

    /// Training produced a non-finite loss (NaN or Inf).
    ///
    /// Unrecoverable within a run; carries the last epoch that completed
    /// with a finite loss.
    NumericalInstability {
        /// Epoch at which the loss became non-finite
        epoch: usize,
        /// Loss of the last finite epoch (NaN if the first epoch blew up)
        last_loss: f64,
    },

    /// Negative sampling exhausted its retry budget before reaching the
    /// requested count.
    ///
    /// Advisory only: training proceeds with the smaller negative set.
    NegativeSampleExhaustion {
        /// Number of negative edges requested
        requested: usize,
        /// Number actually drawn
        drawn: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },
}

impl fmt::Display for EnlazarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnlazarError::ShapeMismatch { expected, actual } => {
                write!(f, "Matrix shape mismatch: expected {expected}, got {actual}")
            }
            EnlazarError::EmptyGraph { nodes, edges } => {
                write!(
                    f,
                    "Empty graph: {nodes} nodes and {edges} trainable edges, nothing to predict"
                )
            }
            EnlazarError::NumericalInstability { epoch, last_loss } => {
                write!(
                    f,
                    "Numerical instability at epoch {epoch}: non-finite loss (last finite loss = {last_loss})"
                )
            }
            EnlazarError::NegativeSampleExhaustion { requested, drawn } => {
                write!(
                    f,
                    "Negative sampling exhausted: drew {drawn} of {requested} requested non-edges"
                )
            }
            EnlazarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter {param} = {value}: must satisfy {constraint}"
                )
            }
        }
    }
}

impl std::error::Error for EnlazarError {}

/// Result type alias for Enlazar operations.
pub type Result<T> = std::result::Result<T, EnlazarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_display() {
        let err = EnlazarError::ShapeMismatch {
            expected: "3x4".to_string(),
            actual: "3x2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3x4"));
        assert!(msg.contains("3x2"));
    }

    #[test]
    fn test_numerical_instability_display() {
        let err = EnlazarError::NumericalInstability {
            epoch: 17,
            last_loss: 0.42,
        };
        let msg = err.to_string();
        assert!(msg.contains("epoch 17"));
        assert!(msg.contains("0.42"));
    }

    #[test]
    fn test_negative_sample_exhaustion_display() {
        let err = EnlazarError::NegativeSampleExhaustion {
            requested: 10,
            drawn: 6,
        };
        assert!(err.to_string().contains("6 of 10"));
    }

    #[test]
    fn test_error_trait_object() {
        let err: Box<dyn std::error::Error> = Box::new(EnlazarError::EmptyGraph {
            nodes: 0,
            edges: 0,
        });
        assert!(err.to_string().contains("Empty graph"));
    }
}
