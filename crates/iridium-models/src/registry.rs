//! The model registry: the single authority for version existence,
//! creation, deletion, and enumeration.
//!
//! The registry composes the blob store (durable truth) with the model cache
//! (loaded handles). Mutating operations on the same version key are
//! serialized through a per-version async mutex so a concurrent delete can
//! never race a load-and-populate into torn state; distinct versions proceed
//! in parallel.

use crate::cache::{CacheStats, ModelCache};
use crate::codec;
use crate::error::{RegistryError, RegistryResult};
use crate::linear::LinearModel;
use crate::store::{BlobStore, validate_version};
use chrono::{DateTime, Utc};
use iridium_abstraction::ModelHandle;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Lifecycle status of a version, as reported by `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Persisted in the store but not currently loaded.
    Available,
    /// Persisted and cache-resident.
    Loaded,
}

/// One entry of the registry's enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct ModelVersionInfo {
    pub version: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub status: VersionStatus,
}

/// Registry over one blob store and one cache.
///
/// Every instance is independent; embedders share it behind an `Arc`.
pub struct ModelRegistry {
    store: Arc<dyn BlobStore>,
    cache: ModelCache,
    version_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store, cache: ModelCache::new(), version_locks: Mutex::new(HashMap::new()) }
    }

    /// Returns the exclusion guard for one version key.
    async fn version_lock(&self, version: &str) -> Arc<Mutex<()>> {
        let mut locks = self.version_locks.lock().await;
        Arc::clone(locks.entry(version.to_string()).or_default())
    }

    /// Persists the placeholder model under `version` iff no artifact exists
    /// for it, so `predict` has something to serve out of the box.
    ///
    /// # Returns
    /// `true` if the placeholder was created, `false` if the version already
    /// existed. Callers treat failures as non-fatal: the registry remains
    /// usable for versions uploaded later.
    pub async fn bootstrap(&self, version: &str, placeholder: &LinearModel) -> RegistryResult<bool> {
        validate_version(version)?;
        let lock = self.version_lock(version).await;
        let _guard = lock.lock().await;

        if self.store.contains(version).await? {
            debug!(version = %version, "Bootstrap skipped, version already persisted");
            return Ok(false);
        }

        let bytes = codec::encode_model(placeholder)
            .map_err(|e| RegistryError::Persistence(format!("failed to encode placeholder: {e}")))?;
        self.store.put(version, &bytes).await?;
        info!(version = %version, model = %placeholder.describe(), "Default model bootstrapped");
        Ok(true)
    }

    /// Persists `bytes` as the artifact for `version`, overwriting any
    /// existing artifact and dropping any stale cache entry so the next load
    /// re-reads from storage.
    pub async fn put(&self, version: &str, bytes: &[u8]) -> RegistryResult<()> {
        validate_version(version)?;
        let lock = self.version_lock(version).await;
        let _guard = lock.lock().await;

        self.store.put(version, bytes).await?;
        self.cache.invalidate(version);
        info!(
            version = %version,
            sha256 = %codec::sha256_hex(bytes),
            size = bytes.len(),
            "Artifact persisted"
        );
        Ok(())
    }

    /// Returns the loaded handle for `version`, loading and caching it on a
    /// miss.
    ///
    /// # Errors
    /// `NotFound` if no backing blob exists; `CorruptArtifact` if the blob
    /// does not decode into a queryable model. On decode failure nothing is
    /// cached.
    pub async fn get(&self, version: &str) -> RegistryResult<Arc<dyn ModelHandle>> {
        validate_version(version)?;
        if let Some(handle) = self.cache.get(version) {
            return Ok(handle);
        }

        let lock = self.version_lock(version).await;
        let _guard = lock.lock().await;

        // A concurrent loader may have populated the entry while we waited.
        if let Some(handle) = self.cache.get(version) {
            return Ok(handle);
        }

        let bytes = self
            .store
            .get(version)
            .await?
            .ok_or_else(|| RegistryError::NotFound(version.to_string()))?;
        let model = codec::decode_model(&bytes).map_err(|e| RegistryError::CorruptArtifact {
            version: version.to_string(),
            reason: e.to_string(),
        })?;

        let handle: Arc<dyn ModelHandle> = Arc::new(model);
        self.cache.insert(version, Arc::clone(&handle));
        debug!(version = %version, "Model loaded from store");
        Ok(handle)
    }

    /// Removes the cache entry and backing blob for `version` together.
    ///
    /// # Errors
    /// `NotFound` if the version does not exist in storage; this is checked
    /// before any mutation, so a failed delete leaves no partial state.
    pub async fn delete(&self, version: &str) -> RegistryResult<()> {
        validate_version(version)?;
        let lock = self.version_lock(version).await;
        let _guard = lock.lock().await;

        if !self.store.contains(version).await? {
            return Err(RegistryError::NotFound(version.to_string()));
        }
        self.store.delete(version).await?;
        self.cache.invalidate(version);
        info!(version = %version, "Model version deleted");
        Ok(())
    }

    /// Enumerates every version known to the backing store, annotated with
    /// cache residency. Produced freshly on each call; order is unspecified.
    pub async fn list(&self) -> RegistryResult<Vec<ModelVersionInfo>> {
        let metas = self.store.list().await?;
        let resident = self.cache.resident_keys();

        Ok(metas
            .into_iter()
            .map(|meta| {
                let status = if resident.contains(&meta.version) {
                    VersionStatus::Loaded
                } else {
                    VersionStatus::Available
                };
                ModelVersionInfo {
                    version: meta.version,
                    path: meta.path,
                    created_at: meta.created_at,
                    status,
                }
            })
            .collect())
    }

    /// Current cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry").field("cache", &self.cache.stats()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemBlobStore;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let registry = ModelRegistry::new(Arc::new(MemBlobStore::new()));
        let placeholder = LinearModel::placeholder();

        assert!(registry.bootstrap("default", &placeholder).await.unwrap());
        assert!(!registry.bootstrap("default", &placeholder).await.unwrap());

        let listing = registry.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].version, "default");
    }

    #[tokio::test]
    async fn test_delete_missing_version_is_not_found() {
        let registry = ModelRegistry::new(Arc::new(MemBlobStore::new()));
        let err = registry.delete("ghost").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(v) if v == "ghost"));
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_key() {
        let registry = ModelRegistry::new(Arc::new(MemBlobStore::new()));
        let err = registry.get("../escape").await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidVersion(_)));
    }
}
