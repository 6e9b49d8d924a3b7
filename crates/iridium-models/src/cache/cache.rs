//! ModelCache implementation with explicit invalidation.

use iridium_abstraction::ModelHandle;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::types::{CacheStats, CachedHandle};

/// In-memory mapping from version key to a loaded model handle.
///
/// The cache never loads anything itself; the registry populates it after a
/// successful store read and drops entries when the backing blob is
/// overwritten or deleted. Locks are never held across await points.
#[derive(Debug, Default)]
pub struct ModelCache {
    /// The cache storage (version -> cached handle).
    entries: RwLock<HashMap<String, CachedHandle>>,
    /// Cache statistics.
    stats: RwLock<CacheStats>,
}

impl ModelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `version`, recording a hit or miss.
    pub fn get(&self, version: &str) -> Option<Arc<dyn ModelHandle>> {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        if let Some(cached) = entries.get_mut(version) {
            cached.touch();
            let handle = Arc::clone(&cached.handle);
            drop(entries);

            let mut stats = self.stats.write().expect("stats lock poisoned");
            stats.total_hits += 1;
            debug!(version = %version, "Cache hit");
            return Some(handle);
        }
        drop(entries);

        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.total_misses += 1;
        debug!(version = %version, "Cache miss");
        None
    }

    /// Inserts a freshly loaded handle, replacing any existing entry.
    pub fn insert(&self, version: &str, handle: Arc<dyn ModelHandle>) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(version.to_string(), CachedHandle::new(handle));
        let size = entries.len();
        drop(entries);

        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.cache_size = size;
        info!(version = %version, "Model cached");
    }

    /// Drops the entry for `version`.
    ///
    /// # Returns
    /// `true` if an entry was removed, `false` if the version was not
    /// resident.
    pub fn invalidate(&self, version: &str) -> bool {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let removed = entries.remove(version).is_some();
        let size = entries.len();
        drop(entries);

        if removed {
            let mut stats = self.stats.write().expect("stats lock poisoned");
            stats.total_invalidations += 1;
            stats.cache_size = size;
            info!(version = %version, "Cache entry invalidated");
        }
        removed
    }

    /// Whether `version` is currently resident. Does not count as an access.
    pub fn contains(&self, version: &str) -> bool {
        let entries = self.entries.read().expect("cache lock poisoned");
        entries.contains_key(version)
    }

    /// Snapshot of the currently resident version keys.
    pub fn resident_keys(&self) -> HashSet<String> {
        let entries = self.entries.read().expect("cache lock poisoned");
        entries.keys().cloned().collect()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let cleared_count = entries.len();
        entries.clear();
        drop(entries);

        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.cache_size = 0;
        info!(cleared_count, "Cleared all handles from cache");
    }

    /// Current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let stats = self.stats.read().expect("stats lock poisoned");
        let mut result = stats.clone();
        drop(stats);
        let entries = self.entries.read().expect("cache lock poisoned");
        result.cache_size = entries.len();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearModel;

    fn handle() -> Arc<dyn ModelHandle> {
        Arc::new(LinearModel::placeholder())
    }

    #[test]
    fn test_hit_returns_same_instance() {
        let cache = ModelCache::new();
        let inserted = handle();
        cache.insert("v1", Arc::clone(&inserted));

        let first = cache.get("v1").unwrap();
        let second = cache.get("v1").unwrap();
        assert!(Arc::ptr_eq(&first, &inserted));
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.total_misses, 0);
        assert_eq!(stats.cache_size, 1);
    }

    #[test]
    fn test_miss_is_counted() {
        let cache = ModelCache::new();
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.stats().total_misses, 1);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = ModelCache::new();
        cache.insert("v1", handle());
        assert!(cache.contains("v1"));

        assert!(cache.invalidate("v1"));
        assert!(!cache.contains("v1"));
        assert!(!cache.invalidate("v1"));

        let stats = cache.stats();
        assert_eq!(stats.total_invalidations, 1);
        assert_eq!(stats.cache_size, 0);
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let cache = ModelCache::new();
        cache.insert("v1", handle());
        let replacement = handle();
        cache.insert("v1", Arc::clone(&replacement));

        let got = cache.get("v1").unwrap();
        assert!(Arc::ptr_eq(&got, &replacement));
        assert_eq!(cache.stats().cache_size, 1);
    }

    #[test]
    fn test_clear() {
        let cache = ModelCache::new();
        cache.insert("v1", handle());
        cache.insert("v2", handle());
        assert_eq!(cache.stats().cache_size, 2);

        cache.clear();
        assert_eq!(cache.stats().cache_size, 0);
        assert!(cache.resident_keys().is_empty());
    }
}
