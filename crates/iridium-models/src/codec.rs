//! Artifact codec: serialized blob <-> query-ready model.
//!
//! Artifacts are stored as JSON. Decoding validates the model's structure so
//! that a blob which parses but cannot be queried is still rejected; the
//! registry maps both failure shapes to `CorruptArtifact` and never caches
//! the result.

use crate::linear::LinearModel;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed artifact json: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid model structure: {0}")]
    Invalid(String),
}

/// Serializes a model into its persisted artifact bytes.
pub fn encode_model(model: &LinearModel) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(model)?)
}

/// Deserializes artifact bytes into a query-ready model.
///
/// # Errors
/// Returns `CodecError::Malformed` if the bytes are not valid JSON for a
/// model, or `CodecError::Invalid` if the decoded model is structurally
/// unsound.
pub fn decode_model(bytes: &[u8]) -> Result<LinearModel, CodecError> {
    let model: LinearModel = serde_json::from_slice(bytes)?;
    model.validate().map_err(CodecError::Invalid)?;
    Ok(model)
}

/// Hex-encoded SHA-256 digest of artifact bytes, for integrity logging.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
