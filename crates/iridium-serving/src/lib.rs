//! Serving layer for versioned machine-learning artifacts.
//!
//! This crate composes the model registry (`iridium-models`) and the
//! retraining tracker (`iridium-training`) into the `ServingFacade`, the
//! surface a transport layer calls to answer predict, upload, delete, list,
//! retrain, and job-status requests. It also owns the configuration, the
//! caller identity label used for logging, and the error taxonomy exposed
//! upward.

pub mod config;
pub mod error;
pub mod facade;
pub mod identity;

pub use config::{ConfigError, ServingConfig};
pub use error::{ServingError, ServingResult};
pub use facade::{Prediction, ServingFacade};
pub use identity::Identity;

// Re-exported so transport layers need only this crate for the payloads
// the facade produces and consumes.
pub use iridium_models::{ModelVersionInfo, VersionStatus};
pub use iridium_training::{HyperParams, JobState, ParamValue, RetrainJob, RetrainJobId};
