use thiserror::Error;

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("model version '{0}' not found")]
    NotFound(String),

    #[error("artifact for version '{version}' is corrupt: {reason}")]
    CorruptArtifact { version: String, reason: String },

    #[error("invalid model version key: {0}")]
    InvalidVersion(String),

    #[error("storage failure: {0}")]
    Persistence(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Whether this error means the backing store could not be read or
    /// written, as opposed to a bad request or a bad artifact.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Io(_))
    }
}
