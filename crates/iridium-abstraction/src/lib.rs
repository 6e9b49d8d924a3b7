//! Model abstraction layer for Iridium.
//!
//! This module defines the core trait and error type for query-ready model
//! handles. The registry and serving layers only ever see models through
//! `ModelHandle`; the concrete architecture behind a handle is opaque to them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when querying a model handle.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferenceError {
    /// The feature vector does not match the model's expected input width.
    #[error("dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// The input width the model was built with.
        expected: usize,
        /// The number of features actually supplied.
        actual: usize,
    },

    /// The engine failed while computing the output vector.
    #[error("inference failed: {0}")]
    Failed(String),
}

/// An in-memory, query-ready instance of a deserialized model.
///
/// All handles must be `Send + Sync` to allow concurrent use across request
/// handlers. Handles are immutable once constructed; replacing a model means
/// persisting a new artifact and loading a fresh handle.
pub trait ModelHandle: Send + Sync {
    /// The fixed number of input features the model accepts.
    fn input_dim(&self) -> usize;

    /// The fixed width of the output vector the model produces.
    fn output_dim(&self) -> usize;

    /// Runs inference over a fixed-size numeric feature vector.
    ///
    /// # Errors
    /// Returns `InferenceError::DimensionMismatch` if `features` does not
    /// have exactly `input_dim()` elements, or `InferenceError::Failed` if
    /// the engine cannot produce an output.
    fn infer(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// A short human-readable description of the handle, for logging.
    fn describe(&self) -> String;
}

impl std::fmt::Debug for dyn ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}
