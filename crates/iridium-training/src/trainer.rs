use crate::error::{TrainingError, TrainingResult};
use crate::job::{ParamValue, RetrainJobSpec, TrainingMetrics};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A retraining backend.
///
/// The tracker owns the job lifecycle; a trainer only turns a spec into
/// metrics (or an error). Implementations must be safe to run from a
/// background task.
#[async_trait]
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    async fn run(&self, spec: &RetrainJobSpec) -> TrainingResult<TrainingMetrics>;
}

/// Deterministic stand-in for a real training backend.
///
/// Derives a fake loss curve from the hyperparameters and yields to the
/// scheduler between epochs. An optional per-epoch delay widens the RUNNING
/// window for callers that want to observe it.
#[derive(Debug, Default)]
pub struct SimulatedTrainer {
    epoch_delay: Option<Duration>,
}

impl SimulatedTrainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_epoch_delay(delay: Duration) -> Self {
        Self { epoch_delay: Some(delay) }
    }

    fn epochs(spec: &RetrainJobSpec) -> u32 {
        match spec.hyperparams.get("epochs") {
            Some(ParamValue::Int(n)) if *n > 0 => u32::try_from(*n).unwrap_or(1),
            _ => 1,
        }
    }

    fn learning_rate(spec: &RetrainJobSpec) -> TrainingResult<f64> {
        let lr = match spec.hyperparams.get("lr").or_else(|| spec.hyperparams.get("learning_rate"))
        {
            Some(ParamValue::Float(lr)) => *lr,
            Some(ParamValue::Int(lr)) => *lr as f64,
            _ => 2e-5,
        };
        if !lr.is_finite() || lr <= 0.0 {
            return Err(TrainingError::Trainer(format!("learning rate must be positive, got {lr}")));
        }
        Ok(lr)
    }
}

#[async_trait]
impl Trainer for SimulatedTrainer {
    fn id(&self) -> &'static str {
        "simulated"
    }

    async fn run(&self, spec: &RetrainJobSpec) -> TrainingResult<TrainingMetrics> {
        let epochs = Self::epochs(spec);
        let lr = Self::learning_rate(spec)?;

        let mut loss = 1.0;
        for epoch in 0..epochs {
            match self.epoch_delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
            loss /= 1.0 + lr;
            debug!(
                trainer = self.id(),
                version = %spec.model_version,
                dataset = %spec.dataset_ref,
                epoch = epoch + 1,
                loss,
                "Simulated epoch finished"
            );
        }

        Ok(TrainingMetrics { final_loss: loss, epochs_run: epochs })
    }
}
