use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid retraining request: {0}")]
    InvalidRequest(String),

    #[error("retraining job '{0}' not found")]
    JobNotFound(String),

    #[error("invalid job transition: {0}")]
    InvalidState(String),

    #[error("trainer error: {0}")]
    Trainer(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
