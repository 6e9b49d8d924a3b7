//! End-to-end tests for the serving facade.

use iridium_models::{BlobStore, LinearModel, MemBlobStore, ModelRegistry, encode_model};
use iridium_serving::{
    Identity, JobState, ServingConfig, ServingError, ServingFacade, VersionStatus,
};
use iridium_training::{HyperParams, ParamValue, RetrainingTracker, SimulatedTrainer};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
}

async fn fs_facade(temp: &TempDir) -> ServingFacade {
    init_tracing();
    let config = ServingConfig {
        model_dir: temp.path().to_path_buf(),
        ..ServingConfig::default()
    };
    ServingFacade::open(config).await.unwrap()
}

async fn mem_facade(store: Arc<MemBlobStore>, bootstrap: bool) -> ServingFacade {
    init_tracing();
    let registry = Arc::new(ModelRegistry::new(Arc::clone(&store) as Arc<dyn BlobStore>));
    let tracker = Arc::new(RetrainingTracker::new(Arc::new(SimulatedTrainer::new())));
    let config = ServingConfig { bootstrap_default: bootstrap, ..ServingConfig::default() };
    ServingFacade::new(registry, tracker, config).await
}

fn caller() -> Identity {
    Identity::new("tester")
}

fn valid_blob() -> Vec<u8> {
    encode_model(&LinearModel::placeholder()).unwrap()
}

async fn wait_terminal(facade: &ServingFacade, job_id: &str) -> iridium_serving::RetrainJob {
    for _ in 0..200 {
        let job = facade.job_status(&caller(), job_id).unwrap();
        if job.state.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}

#[tokio::test]
async fn test_bootstrap_lists_exactly_the_default_version() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let listing = facade.enumerate(&caller()).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].version, "default");
    assert_eq!(listing[0].status, VersionStatus::Available);
}

#[tokio::test]
async fn test_predict_default_version_output_width() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let prediction = facade.predict(&caller(), None, &[0.0; 10]).await.unwrap();
    assert_eq!(prediction.output.len(), 1);
    assert_eq!(prediction.version, "default");
}

#[tokio::test]
async fn test_predict_rejects_wrong_feature_width() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let err = facade.predict(&caller(), Some("default"), &[0.0; 3]).await.unwrap_err();
    assert!(matches!(err, ServingError::InvalidInput(_)));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_upload_delete_predict_is_not_found() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    facade.upload(&caller(), "v2", &valid_blob()).await.unwrap();
    facade.remove(&caller(), "v2").await.unwrap();

    let err = facade.predict(&caller(), Some("v2"), &[0.0; 10]).await.unwrap_err();
    assert!(matches!(err, ServingError::NotFound(_)));
}

#[tokio::test]
async fn test_retrain_reaches_completed_with_timestamps() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let mut params = HyperParams::new();
    params.insert("lr".to_string(), ParamValue::Float(0.01));
    let job_id = facade
        .retrain(&caller(), Some("v2"), Some("data.csv"), params)
        .unwrap();

    let job = wait_terminal(&facade, &job_id.0).await;
    assert_eq!(job.state, JobState::Completed);
    assert!(job.finished_at.is_some());
    assert!(job.finished_at.unwrap() >= job.started_at);
    assert_eq!(job.spec.dataset_ref, "data.csv");
}

#[tokio::test]
async fn test_invalid_upload_rolls_back_exactly() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let err = facade.upload(&caller(), "broken", b"definitely not a model").await.unwrap_err();
    assert!(matches!(err, ServingError::InvalidArtifact { .. }));

    // No trace: the listing has no entry and the byte store has no file.
    let versions: Vec<String> =
        facade.enumerate(&caller()).await.unwrap().into_iter().map(|info| info.version).collect();
    assert!(!versions.contains(&"broken".to_string()));
    assert!(!temp.path().join("model_broken.json").exists());
}

#[tokio::test]
async fn test_predict_unknown_version_never_substitutes() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let err = facade.predict(&caller(), Some("nope"), &[0.0; 10]).await.unwrap_err();
    assert!(matches!(err, ServingError::NotFound(_)));
}

#[tokio::test]
async fn test_upload_then_predict_marks_version_loaded() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    facade.upload(&caller(), "v3", &valid_blob()).await.unwrap();
    let prediction = facade.predict(&caller(), Some("v3"), &[1.0; 10]).await.unwrap();
    assert_eq!(prediction.version, "v3");

    let listing = facade.enumerate(&caller()).await.unwrap();
    let entry = listing.iter().find(|info| info.version == "v3").unwrap();
    assert_eq!(entry.status, VersionStatus::Loaded);
}

#[tokio::test]
async fn test_retrain_without_dataset_uses_default() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let job_id = facade.retrain(&caller(), None, None, HyperParams::new()).unwrap();
    let job = facade.job_status(&caller(), &job_id.0).unwrap();
    assert_eq!(job.spec.dataset_ref, "default_dataset");
    assert_eq!(job.spec.model_version, "default");
}

#[tokio::test]
async fn test_retrain_with_empty_dataset_is_rejected() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let err = facade.retrain(&caller(), None, Some(""), HyperParams::new()).unwrap_err();
    assert!(matches!(err, ServingError::InvalidInput(_)));
}

#[tokio::test]
async fn test_job_status_unknown_id_is_not_found() {
    let temp = TempDir::new().unwrap();
    let facade = fs_facade(&temp).await;

    let err = facade.job_status(&caller(), "no-such-job").unwrap_err();
    assert!(matches!(err, ServingError::NotFound(_)));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_persistence() {
    let store = Arc::new(MemBlobStore::new());
    let facade = mem_facade(Arc::clone(&store), false).await;

    store.set_failing(true);
    let err = facade.upload(&caller(), "v1", &valid_blob()).await.unwrap_err();
    assert!(matches!(err, ServingError::Persistence(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_bootstrap_failure_is_non_fatal() {
    let store = Arc::new(MemBlobStore::new());
    store.set_failing(true);

    // Construction succeeds despite the store refusing the bootstrap write.
    let facade = mem_facade(Arc::clone(&store), true).await;
    store.set_failing(false);

    // The facade remains usable for versions uploaded later.
    facade.upload(&caller(), "v1", &valid_blob()).await.unwrap();
    let prediction = facade.predict(&caller(), Some("v1"), &[0.0; 10]).await.unwrap();
    assert_eq!(prediction.output.len(), 1);

    // The default version was never created.
    let err = facade.predict(&caller(), None, &[0.0; 10]).await.unwrap_err();
    assert!(matches!(err, ServingError::NotFound(_)));
}
