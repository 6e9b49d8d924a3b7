//! Core data types for model caching.

use iridium_abstraction::ModelHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// A cached handle with access metadata.
#[derive(Clone)]
pub struct CachedHandle {
    /// The loaded, query-ready model instance.
    pub handle: Arc<dyn ModelHandle>,
    /// Timestamp when the handle was first cached.
    pub cached_at: Instant,
    /// Timestamp of last access.
    pub last_accessed: Instant,
    /// Number of times this handle has been served from the cache.
    pub access_count: u64,
}

impl CachedHandle {
    /// Wraps a freshly loaded handle.
    #[must_use]
    pub fn new(handle: Arc<dyn ModelHandle>) -> Self {
        let now = Instant::now();
        Self { handle, cached_at: now, last_accessed: now, access_count: 0 }
    }

    /// Updates the last accessed timestamp and increments the access count.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

impl std::fmt::Debug for CachedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedHandle")
            .field("model", &self.handle.describe())
            .field("cached_at", &self.cached_at)
            .field("last_accessed", &self.last_accessed)
            .field("access_count", &self.access_count)
            .finish()
    }
}

/// Cache statistics for observability.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Total number of cache hits.
    pub total_hits: u64,
    /// Total number of cache misses.
    pub total_misses: u64,
    /// Total number of explicit invalidations (overwrite or delete).
    pub total_invalidations: u64,
    /// Current number of handles in cache.
    pub cache_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearModel;

    #[test]
    fn test_cached_handle_touch() {
        let handle: Arc<dyn ModelHandle> = Arc::new(LinearModel::placeholder());
        let mut cached = CachedHandle::new(handle);
        assert_eq!(cached.access_count, 0);

        let before = cached.last_accessed;
        std::thread::sleep(std::time::Duration::from_millis(5));
        cached.touch();

        assert_eq!(cached.access_count, 1);
        assert!(cached.last_accessed > before);
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.total_hits, 0);
        assert_eq!(stats.total_misses, 0);
        assert_eq!(stats.total_invalidations, 0);
        assert_eq!(stats.cache_size, 0);
    }
}
