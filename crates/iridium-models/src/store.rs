//! Durable byte store for versioned model artifacts.
//!
//! A store maps a version key to one opaque blob. The registry is the only
//! consumer; it layers caching, decoding, and per-version exclusion on top.
//! Two implementations ship here: a filesystem store for real deployments
//! and an instrumented in-memory store for tests and embedders.

use crate::error::{RegistryError, RegistryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Metadata for one stored artifact, as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    /// The version key the blob is stored under.
    pub version: String,
    /// Where the blob lives (informational; scheme depends on the store).
    pub path: PathBuf,
    /// When the blob was first persisted.
    pub created_at: DateTime<Utc>,
}

/// Key -> blob storage for model artifacts.
///
/// `get` and `delete` report absence through their return value rather than
/// an error; deciding whether absence is a failure is the registry's job.
/// All other failures are I/O-level and surface as persistence errors.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists `bytes` under `version`, overwriting any existing blob.
    async fn put(&self, version: &str, bytes: &[u8]) -> RegistryResult<()>;

    /// Reads the blob for `version`, or `None` if absent.
    async fn get(&self, version: &str) -> RegistryResult<Option<Vec<u8>>>;

    /// Removes the blob for `version`. Returns whether a blob was removed.
    async fn delete(&self, version: &str) -> RegistryResult<bool>;

    /// Whether a blob exists for `version`.
    async fn contains(&self, version: &str) -> RegistryResult<bool>;

    /// Enumerates every stored artifact. Order is unspecified.
    async fn list(&self) -> RegistryResult<Vec<BlobMeta>>;
}

/// Rejects keys that are empty or could escape the store's namespace.
pub fn validate_version(version: &str) -> RegistryResult<()> {
    if version.trim().is_empty() {
        return Err(RegistryError::InvalidVersion("version key is empty".to_string()));
    }
    if version.contains('/') || version.contains('\\') || version.contains("..") {
        return Err(RegistryError::InvalidVersion(format!(
            "version key '{version}' contains path components"
        )));
    }
    Ok(())
}

/// Filesystem-backed store: one `model_<version>.json` file per version
/// under a root directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

const FILE_PREFIX: &str = "model_";
const FILE_SUFFIX: &str = ".json";

impl FsBlobStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> RegistryResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, version: &str) -> PathBuf {
        self.root.join(format!("{FILE_PREFIX}{version}{FILE_SUFFIX}"))
    }

    fn version_of(file_name: &str) -> Option<&str> {
        file_name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, version: &str, bytes: &[u8]) -> RegistryResult<()> {
        validate_version(version)?;
        let path = self.blob_path(version);
        tokio::fs::write(&path, bytes).await?;
        debug!(version = %version, path = %path.display(), size = bytes.len(), "Blob written");
        Ok(())
    }

    async fn get(&self, version: &str) -> RegistryResult<Option<Vec<u8>>> {
        validate_version(version)?;
        match tokio::fs::read(self.blob_path(version)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, version: &str) -> RegistryResult<bool> {
        validate_version(version)?;
        match tokio::fs::remove_file(self.blob_path(version)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, version: &str) -> RegistryResult<bool> {
        validate_version(version)?;
        Ok(tokio::fs::try_exists(self.blob_path(version)).await?)
    }

    async fn list(&self) -> RegistryResult<Vec<BlobMeta>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            let Some(version) = Self::version_of(name) else { continue };

            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            // Creation time is unsupported on some filesystems.
            let created = meta.created().or_else(|_| meta.modified())?;
            out.push(BlobMeta {
                version: version.to_string(),
                path: entry.path(),
                created_at: DateTime::<Utc>::from(created),
            });
        }
        Ok(out)
    }
}

struct MemBlob {
    bytes: Vec<u8>,
    created_at: DateTime<Utc>,
}

/// In-memory store with read/write counters and a failure-injection switch.
///
/// The counters let tests assert that a cache hit never touches the store;
/// the switch exercises persistence-failure paths without a real disk fault.
#[derive(Default)]
pub struct MemBlobStore {
    blobs: RwLock<HashMap<String, MemBlob>>,
    reads: AtomicU64,
    writes: AtomicU64,
    failing: AtomicBool,
}

impl MemBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `put` calls served so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// When set, every store operation fails with a persistence error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> RegistryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RegistryError::Persistence("injected store failure".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemBlobStore")
            .field("blobs", &self.blobs.read().expect("store lock poisoned").len())
            .field("reads", &self.read_count())
            .field("writes", &self.write_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BlobStore for MemBlobStore {
    async fn put(&self, version: &str, bytes: &[u8]) -> RegistryResult<()> {
        validate_version(version)?;
        self.check_failing()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut blobs = self.blobs.write().expect("store lock poisoned");
        match blobs.entry(version.to_string()) {
            Entry::Occupied(mut occupied) => occupied.get_mut().bytes = bytes.to_vec(),
            Entry::Vacant(vacant) => {
                vacant.insert(MemBlob { bytes: bytes.to_vec(), created_at: Utc::now() });
            }
        }
        Ok(())
    }

    async fn get(&self, version: &str) -> RegistryResult<Option<Vec<u8>>> {
        validate_version(version)?;
        self.check_failing()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let blobs = self.blobs.read().expect("store lock poisoned");
        Ok(blobs.get(version).map(|blob| blob.bytes.clone()))
    }

    async fn delete(&self, version: &str) -> RegistryResult<bool> {
        validate_version(version)?;
        self.check_failing()?;
        let mut blobs = self.blobs.write().expect("store lock poisoned");
        Ok(blobs.remove(version).is_some())
    }

    async fn contains(&self, version: &str) -> RegistryResult<bool> {
        validate_version(version)?;
        self.check_failing()?;
        let blobs = self.blobs.read().expect("store lock poisoned");
        Ok(blobs.contains_key(version))
    }

    async fn list(&self) -> RegistryResult<Vec<BlobMeta>> {
        self.check_failing()?;
        let blobs = self.blobs.read().expect("store lock poisoned");
        Ok(blobs
            .iter()
            .map(|(version, blob)| BlobMeta {
                version: version.clone(),
                path: PathBuf::from(format!("mem://{version}")),
                created_at: blob.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_version_rejects_bad_keys() {
        assert!(validate_version("").is_err());
        assert!(validate_version("   ").is_err());
        assert!(validate_version("a/b").is_err());
        assert!(validate_version("a\\b").is_err());
        assert!(validate_version("..").is_err());
        assert!(validate_version("v1.2").is_ok());
        assert!(validate_version("default").is_ok());
    }

    #[tokio::test]
    async fn test_fs_store_put_get_delete() {
        let temp = TempDir::new().unwrap();
        let store = FsBlobStore::open(temp.path()).await.unwrap();

        assert_eq!(store.get("v1").await.unwrap(), None);
        store.put("v1", b"payload").await.unwrap();
        assert_eq!(store.get("v1").await.unwrap(), Some(b"payload".to_vec()));
        assert!(store.contains("v1").await.unwrap());

        assert!(store.delete("v1").await.unwrap());
        assert!(!store.delete("v1").await.unwrap());
        assert_eq!(store.get("v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fs_store_list_reports_versions() {
        let temp = TempDir::new().unwrap();
        let store = FsBlobStore::open(temp.path()).await.unwrap();
        store.put("alpha", b"a").await.unwrap();
        store.put("beta", b"b").await.unwrap();
        // An unrelated file in the directory is ignored.
        std::fs::write(temp.path().join("notes.txt"), "x").unwrap();

        let mut versions: Vec<String> =
            store.list().await.unwrap().into_iter().map(|m| m.version).collect();
        versions.sort();
        assert_eq!(versions, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[tokio::test]
    async fn test_mem_store_counts_reads_and_writes() {
        let store = MemBlobStore::new();
        store.put("v1", b"a").await.unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.read_count(), 0);

        let _ = store.get("v1").await.unwrap();
        let _ = store.get("v1").await.unwrap();
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_mem_store_failure_injection() {
        let store = MemBlobStore::new();
        store.put("v1", b"a").await.unwrap();
        store.set_failing(true);
        assert!(store.get("v1").await.unwrap_err().is_persistence());
        assert!(store.put("v2", b"b").await.unwrap_err().is_persistence());

        store.set_failing(false);
        assert_eq!(store.get("v1").await.unwrap(), Some(b"a".to_vec()));
    }
}
