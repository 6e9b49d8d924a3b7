//! Iridium Training
//!
//! Retraining primitives for the serving core:
//! - Describing retraining requests (`RetrainJobSpec`, `HyperParams`)
//! - Tracking job lifecycle (`RetrainingTracker`)
//! - Implementing retraining backends (`Trainer`)

pub mod error;
pub mod job;
pub mod tracker;
pub mod trainer;

pub use error::{TrainingError, TrainingResult};
pub use job::{
    HyperParams, JobOutcome, JobState, ParamValue, RetrainJob, RetrainJobId, RetrainJobSpec,
    TrainingMetrics,
};
pub use tracker::RetrainingTracker;
pub use trainer::{SimulatedTrainer, Trainer};
