use crate::error::{TrainingError, TrainingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifier for a retraining job.
///
/// Ids are random (uuid v4), so concurrent submissions within the same time
/// granularity can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetrainJobId(pub String);

impl RetrainJobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RetrainJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RetrainJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single hyperparameter value: integer, float, or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Hyperparameter mapping; keys are unique by construction.
pub type HyperParams = BTreeMap<String, ParamValue>;

/// What a caller asks the tracker to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainJobSpec {
    /// The model version the retraining targets.
    pub model_version: String,
    /// Reference to the training data (opaque to the tracker).
    pub dataset_ref: String,
    #[serde(default)]
    pub hyperparams: HyperParams,
}

impl RetrainJobSpec {
    #[must_use]
    pub fn new(model_version: impl Into<String>, dataset_ref: impl Into<String>) -> Self {
        Self {
            model_version: model_version.into(),
            dataset_ref: dataset_ref.into(),
            hyperparams: HyperParams::new(),
        }
    }

    #[must_use]
    pub fn with_hyperparams(mut self, hyperparams: HyperParams) -> Self {
        self.hyperparams = hyperparams;
        self
    }

    pub fn validate(&self) -> TrainingResult<()> {
        if self.model_version.trim().is_empty() {
            return Err(TrainingError::InvalidRequest("model_version is required".to_string()));
        }
        if self.dataset_ref.trim().is_empty() {
            return Err(TrainingError::InvalidRequest("dataset_ref is required".to_string()));
        }
        Ok(())
    }
}

/// Lifecycle state of a job. RUNNING is exclusive with the terminal states;
/// a terminal job is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Running,
    Completed,
    Failed,
}

impl JobState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => f.write_str("RUNNING"),
            Self::Completed => f.write_str("COMPLETED"),
            Self::Failed => f.write_str("FAILED"),
        }
    }
}

/// Metrics reported by a trainer for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub final_loss: f64,
    pub epochs_run: u32,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(TrainingMetrics),
    Failed(String),
}

/// One submitted retraining job with its lifecycle state.
///
/// Callers only ever receive clones of this record, never references into
/// the tracker's map.
#[derive(Debug, Clone, Serialize)]
pub struct RetrainJob {
    pub id: RetrainJobId,
    pub spec: RetrainJobSpec,
    pub state: JobState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub metrics: Option<TrainingMetrics>,
    pub failure: Option<String>,
}

impl RetrainJob {
    pub(crate) fn running(id: RetrainJobId, spec: RetrainJobSpec) -> Self {
        Self {
            id,
            spec,
            state: JobState::Running,
            started_at: Utc::now(),
            finished_at: None,
            metrics: None,
            failure: None,
        }
    }
}
