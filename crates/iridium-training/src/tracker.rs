//! Retraining job tracking.
//!
//! The tracker is the single authority for job lifecycle:
//! `SUBMIT -> RUNNING -> {COMPLETED | FAILED}`. Submission records the job
//! and hands the actual work to a background tokio task; polling `status` is
//! the only way to observe completion. Terminal jobs are never re-entered
//! and the history is never pruned.

use crate::error::{TrainingError, TrainingResult};
use crate::job::{JobOutcome, JobState, RetrainJob, RetrainJobId, RetrainJobSpec};
use crate::trainer::Trainer;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

type JobTable = Arc<RwLock<HashMap<RetrainJobId, RetrainJob>>>;

/// Tracks submitted retraining jobs and drives them to a terminal state.
pub struct RetrainingTracker {
    trainer: Arc<dyn Trainer>,
    jobs: JobTable,
}

impl RetrainingTracker {
    #[must_use]
    pub fn new(trainer: Arc<dyn Trainer>) -> Self {
        Self { trainer, jobs: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Records a RUNNING job and spawns the trainer on a background task.
    ///
    /// Returns as soon as the job is recorded; must be called from within a
    /// tokio runtime.
    ///
    /// # Errors
    /// `InvalidRequest` if the spec does not validate; nothing is recorded
    /// in that case.
    pub fn submit(&self, spec: RetrainJobSpec) -> TrainingResult<RetrainJobId> {
        spec.validate()?;

        let id = RetrainJobId::new();
        let job = RetrainJob::running(id.clone(), spec.clone());
        {
            let mut jobs = self.jobs.write().expect("job table lock poisoned");
            jobs.insert(id.clone(), job);
        }
        info!(
            job_id = %id,
            version = %spec.model_version,
            dataset = %spec.dataset_ref,
            trainer = self.trainer.id(),
            "Retraining job submitted"
        );

        let trainer = Arc::clone(&self.trainer);
        let jobs = Arc::clone(&self.jobs);
        let task_id = id.clone();
        tokio::spawn(async move {
            let outcome = match trainer.run(&spec).await {
                Ok(metrics) => {
                    info!(job_id = %task_id, final_loss = metrics.final_loss, "Retraining job completed");
                    JobOutcome::Completed(metrics)
                }
                Err(e) => {
                    warn!(job_id = %task_id, error = %e, "Retraining job failed");
                    JobOutcome::Failed(e.to_string())
                }
            };
            if let Err(e) = Self::finish(&jobs, &task_id, outcome) {
                warn!(job_id = %task_id, error = %e, "Could not record job outcome");
            }
        });

        Ok(id)
    }

    /// Transitions a RUNNING job to a terminal state.
    ///
    /// # Errors
    /// `InvalidState` if the job is unknown or already terminal; completing
    /// anything but a RUNNING job is a logic error on the caller's side.
    pub fn complete(&self, id: &RetrainJobId, outcome: JobOutcome) -> TrainingResult<()> {
        Self::finish(&self.jobs, id, outcome)
    }

    /// Returns an immutable snapshot of the job's current state.
    pub fn status(&self, id: &RetrainJobId) -> TrainingResult<RetrainJob> {
        let jobs = self.jobs.read().expect("job table lock poisoned");
        jobs.get(id).cloned().ok_or_else(|| TrainingError::JobNotFound(id.to_string()))
    }

    /// Snapshots of every tracked job. Order is unspecified.
    pub fn jobs(&self) -> Vec<RetrainJob> {
        let jobs = self.jobs.read().expect("job table lock poisoned");
        jobs.values().cloned().collect()
    }

    fn finish(jobs: &JobTable, id: &RetrainJobId, outcome: JobOutcome) -> TrainingResult<()> {
        let mut jobs = jobs.write().expect("job table lock poisoned");
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| TrainingError::InvalidState(format!("job {id} is unknown")))?;
        if job.state.is_terminal() {
            return Err(TrainingError::InvalidState(format!(
                "job {id} is already {}",
                job.state
            )));
        }

        job.finished_at = Some(Utc::now());
        match outcome {
            JobOutcome::Completed(metrics) => {
                job.state = JobState::Completed;
                job.metrics = Some(metrics);
            }
            JobOutcome::Failed(reason) => {
                job.state = JobState::Failed;
                job.failure = Some(reason);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RetrainingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrainingTracker")
            .field("trainer", &self.trainer.id())
            .field("jobs", &self.jobs.read().map(|jobs| jobs.len()).unwrap_or(0))
            .finish_non_exhaustive()
    }
}
