//! Error types for the autoencoder engine
//!
//! Every fallible operation in `qae-core` returns [`Result`]. Errors are
//! synchronous and never retried: the engine is deterministic, so repeating a
//! failed computation with the same inputs cannot change the outcome.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, QaeError>;

/// Error taxonomy of the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QaeError {
    // ==========================================================================
    // Construction
    // ==========================================================================
    /// Invalid configuration, detected eagerly at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation called in the wrong lifecycle state, e.g. a second `run`
    #[error("Invalid lifecycle: {0}")]
    InvalidLifecycle(String),

    // ==========================================================================
    // Shapes
    // ==========================================================================
    /// Parameter vector length does not match the ansatz
    #[error("Shape mismatch: expected {expected} parameters, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Matrix or vector dimensions are inconsistent
    #[error("Dimension mismatch: expected dimension {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // ==========================================================================
    // States
    // ==========================================================================
    /// Amplitude vector or density matrix violates its invariants
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Qubit subset is empty, out of range or contains duplicates
    #[error("Invalid qubit set: {0}")]
    InvalidQubitSet(String),

    // ==========================================================================
    // Optimization
    // ==========================================================================
    /// Non-finite loss, degenerate simplex or failed decomposition
    #[error("Numerical failure: {0}")]
    NumericalFailure(String),
}

impl QaeError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        QaeError::Configuration(msg.into())
    }

    /// True for errors raised while validating construction parameters
    pub fn is_configuration(&self) -> bool {
        matches!(self, QaeError::Configuration(_))
    }
}
