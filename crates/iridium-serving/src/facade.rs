//! The serving facade.
//!
//! Orchestrates the model registry and retraining tracker behind the six
//! operations the transport layer calls. The facade performs exactly one
//! corrective action of its own (rolling back an upload that fails
//! validation); every other failure propagates unchanged after being logged
//! with the resolved caller identity.

use crate::config::ServingConfig;
use crate::error::{ServingError, ServingResult};
use crate::identity::Identity;
use chrono::{DateTime, Utc};
use iridium_abstraction::ModelHandle;
use iridium_models::{
    FsBlobStore, LinearModel, ModelRegistry, ModelVersionInfo, RegistryError,
};
use iridium_training::{
    HyperParams, RetrainJob, RetrainJobId, RetrainJobSpec, RetrainingTracker, SimulatedTrainer,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dataset reference used when a retraining request names none.
const DEFAULT_DATASET: &str = "default_dataset";

/// The result of one prediction.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub output: Vec<f64>,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Serving facade over one registry and one tracker.
pub struct ServingFacade {
    registry: Arc<ModelRegistry>,
    tracker: Arc<RetrainingTracker>,
    config: ServingConfig,
}

impl ServingFacade {
    /// Composes a facade from injected components, bootstrapping the default
    /// version when configured. Bootstrap failure is logged and non-fatal:
    /// the facade remains usable for versions uploaded later.
    pub async fn new(
        registry: Arc<ModelRegistry>,
        tracker: Arc<RetrainingTracker>,
        config: ServingConfig,
    ) -> Self {
        if config.bootstrap_default {
            let placeholder =
                LinearModel::placeholder_with_dims(config.feature_dim, config.output_dim);
            match registry.bootstrap(&config.default_version, &placeholder).await {
                Ok(true) => {
                    info!(version = %config.default_version, "Default model bootstrapped")
                }
                Ok(false) => {
                    debug!(version = %config.default_version, "Default model already present")
                }
                Err(e) => {
                    warn!(version = %config.default_version, error = %e, "Bootstrap failed; continuing without a default model");
                }
            }
        }
        Self { registry, tracker, config }
    }

    /// Wires up a filesystem-backed facade with the simulated trainer from
    /// configuration alone.
    pub async fn open(config: ServingConfig) -> ServingResult<Self> {
        config.validate().map_err(|e| ServingError::InvalidInput(e.to_string()))?;
        let store = FsBlobStore::open(&config.model_dir).await?;
        let registry = Arc::new(ModelRegistry::new(Arc::new(store)));
        let tracker = Arc::new(RetrainingTracker::new(Arc::new(SimulatedTrainer::new())));
        Ok(Self::new(registry, tracker, config).await)
    }

    #[must_use]
    pub fn config(&self) -> &ServingConfig {
        &self.config
    }

    /// Resolves an absent or blank version to the configured default.
    fn resolve_version(&self, version: Option<&str>) -> String {
        version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| self.config.default_version.clone(), ToString::to_string)
    }

    /// Logs a failed operation with the caller identity; the error kind is
    /// never changed by logging.
    fn report<T>(
        op: &'static str,
        caller: &Identity,
        result: ServingResult<T>,
    ) -> ServingResult<T> {
        if let Err(e) = &result {
            warn!(op, caller = %caller, kind = e.kind(), error = %e, "Operation failed");
        }
        result
    }

    /// Runs inference on the resolved version.
    pub async fn predict(
        &self,
        caller: &Identity,
        version: Option<&str>,
        features: &[f64],
    ) -> ServingResult<Prediction> {
        let resolved = self.resolve_version(version);
        let result = self.predict_inner(&resolved, features).await;
        if result.is_ok() {
            info!(op = "predict", caller = %caller, version = %resolved, "Prediction served");
        }
        Self::report("predict", caller, result)
    }

    async fn predict_inner(&self, version: &str, features: &[f64]) -> ServingResult<Prediction> {
        let handle = self.registry.get(version).await?;
        if features.len() != handle.input_dim() {
            return Err(ServingError::InvalidInput(format!(
                "expected {} features, got {}",
                handle.input_dim(),
                features.len()
            )));
        }
        let output = handle.infer(features)?;
        Ok(Prediction { output, version: version.to_string(), timestamp: Utc::now() })
    }

    /// Persists an uploaded artifact, validating that it loads.
    ///
    /// If validation fails the just-written blob is deleted before the error
    /// surfaces, so no version is ever left persisted-but-unloadable.
    pub async fn upload(
        &self,
        caller: &Identity,
        version: &str,
        bytes: &[u8],
    ) -> ServingResult<()> {
        let result = self.upload_inner(version, bytes).await;
        if result.is_ok() {
            info!(op = "upload", caller = %caller, version = %version, size = bytes.len(), "Model uploaded");
        }
        Self::report("upload", caller, result)
    }

    async fn upload_inner(&self, version: &str, bytes: &[u8]) -> ServingResult<()> {
        self.registry.put(version, bytes).await?;

        if let Err(load_err) = self.registry.get(version).await {
            if let Err(rollback_err) = self.registry.delete(version).await {
                warn!(version = %version, error = %rollback_err, "Rollback of invalid upload failed");
            }
            let reason = match load_err {
                RegistryError::CorruptArtifact { reason, .. } => reason,
                other => other.to_string(),
            };
            return Err(ServingError::InvalidArtifact { version: version.to_string(), reason });
        }
        Ok(())
    }

    /// Deletes a version from cache and storage together.
    pub async fn remove(&self, caller: &Identity, version: &str) -> ServingResult<()> {
        let result = self.registry.delete(version).await.map_err(ServingError::from);
        if result.is_ok() {
            info!(op = "remove", caller = %caller, version = %version, "Model version removed");
        }
        Self::report("remove", caller, result)
    }

    /// Enumerates every persisted version with its cache residency.
    pub async fn enumerate(&self, caller: &Identity) -> ServingResult<Vec<ModelVersionInfo>> {
        let result = self.registry.list().await.map_err(ServingError::from);
        if let Ok(listing) = &result {
            debug!(op = "enumerate", caller = %caller, count = listing.len(), "Model list produced");
        }
        Self::report("enumerate", caller, result)
    }

    /// Submits a retraining job for the resolved version.
    ///
    /// An absent dataset reference falls back to the default dataset; an
    /// explicitly empty one is rejected by the tracker.
    pub fn retrain(
        &self,
        caller: &Identity,
        version: Option<&str>,
        dataset_ref: Option<&str>,
        hyperparams: HyperParams,
    ) -> ServingResult<RetrainJobId> {
        let resolved = self.resolve_version(version);
        let dataset = dataset_ref.unwrap_or(DEFAULT_DATASET).to_string();
        let spec = RetrainJobSpec::new(resolved.clone(), dataset).with_hyperparams(hyperparams);

        let result = self.tracker.submit(spec).map_err(ServingError::from);
        if let Ok(job_id) = &result {
            info!(op = "retrain", caller = %caller, version = %resolved, job_id = %job_id, "Retraining initiated");
        }
        Self::report("retrain", caller, result)
    }

    /// Returns a snapshot of one retraining job.
    pub fn job_status(&self, caller: &Identity, job_id: &str) -> ServingResult<RetrainJob> {
        let id = RetrainJobId(job_id.to_string());
        let result = self.tracker.status(&id).map_err(ServingError::from);
        if let Ok(job) = &result {
            debug!(op = "job_status", caller = %caller, job_id = %job_id, state = %job.state, "Job status read");
        }
        Self::report("job_status", caller, result)
    }
}

impl std::fmt::Debug for ServingFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServingFacade").field("config", &self.config).finish_non_exhaustive()
    }
}
