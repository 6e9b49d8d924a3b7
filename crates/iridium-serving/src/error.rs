//! The error taxonomy exposed to the transport layer.
//!
//! Every facade operation fails with exactly one of these kinds, already
//! split into client-caused and server-caused so the (excluded) HTTP layer
//! can map them to distinct response codes without inspecting messages.

use iridium_abstraction::InferenceError;
use iridium_models::RegistryError;
use iridium_training::TrainingError;
use thiserror::Error;

pub type ServingResult<T> = std::result::Result<T, ServingError>;

#[derive(Debug, Error)]
pub enum ServingError {
    /// Unknown model version or retraining job id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed feature vector, bad version key, or empty required field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An uploaded artifact failed validation and was rolled back.
    #[error("invalid artifact for version '{version}': {reason}")]
    InvalidArtifact { version: String, reason: String },

    /// Illegal retraining job transition.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The byte store could not be read or written.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The inference or training engine failed.
    #[error("inference failure: {0}")]
    Inference(String),
}

impl ServingError {
    /// Stable label for logs and transport mapping.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidArtifact { .. } => "invalid_artifact",
            Self::InvalidState(_) => "invalid_state",
            Self::Persistence(_) => "persistence",
            Self::Inference(_) => "inference",
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::InvalidInput(_)
                | Self::InvalidArtifact { .. }
                | Self::InvalidState(_)
        )
    }
}

impl From<RegistryError> for ServingError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(version) => Self::NotFound(format!("model version '{version}'")),
            RegistryError::CorruptArtifact { version, reason } => {
                Self::InvalidArtifact { version, reason }
            }
            RegistryError::InvalidVersion(reason) => Self::InvalidInput(reason),
            RegistryError::Persistence(reason) => Self::Persistence(reason),
            RegistryError::Io(e) => Self::Persistence(e.to_string()),
        }
    }
}

impl From<TrainingError> for ServingError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::InvalidRequest(reason) => Self::InvalidInput(reason),
            TrainingError::JobNotFound(id) => Self::NotFound(format!("retraining job '{id}'")),
            TrainingError::InvalidState(reason) => Self::InvalidState(reason),
            TrainingError::Trainer(reason) => Self::Inference(reason),
            TrainingError::Other(e) => Self::Inference(e.to_string()),
        }
    }
}

impl From<InferenceError> for ServingError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::DimensionMismatch { expected, actual } => {
                Self::InvalidInput(format!("expected {expected} features, got {actual}"))
            }
            InferenceError::Failed(reason) => Self::Inference(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_errors_map_to_taxonomy() {
        let err: ServingError = RegistryError::NotFound("v9".to_string()).into();
        assert_eq!(err.kind(), "not_found");
        assert!(err.is_client_error());

        let err: ServingError = RegistryError::Persistence("disk gone".to_string()).into();
        assert_eq!(err.kind(), "persistence");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_training_errors_map_to_taxonomy() {
        let err: ServingError = TrainingError::InvalidRequest("dataset_ref".to_string()).into();
        assert_eq!(err.kind(), "invalid_input");

        let err: ServingError = TrainingError::InvalidState("already COMPLETED".to_string()).into();
        assert_eq!(err.kind(), "invalid_state");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_inference_errors_map_to_taxonomy() {
        let err: ServingError = InferenceError::DimensionMismatch { expected: 10, actual: 3 }.into();
        assert_eq!(err.kind(), "invalid_input");

        let err: ServingError = InferenceError::Failed("nan".to_string()).into();
        assert_eq!(err.kind(), "inference");
        assert!(!err.is_client_error());
    }
}
