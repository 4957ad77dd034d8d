//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, ResolutionCache};
use async_trait::async_trait;
use chrono::Duration;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Selected when `CACHE_MAX_ENTRIES=0`. Every lookup is a miss, so every
/// resolution goes to the store.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolutionCache for NullCache {
    async fn get(&self, _slug: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _slug: &str, _target: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    fn generation(&self, _slug: &str) -> u64 {
        0
    }

    async fn put_if_current(
        &self,
        _slug: &str,
        _target: &str,
        _ttl: Duration,
        _generation: u64,
    ) -> CacheResult<bool> {
        Ok(false)
    }

    async fn invalidate(&self, _slug: &str) -> CacheResult<()> {
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        0
    }

    fn run_pending_tasks(&self) {}

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache::new();

        cache
            .put("abc", "https://example.com/", Duration::seconds(300))
            .await
            .unwrap();

        assert_eq!(cache.get("abc").await.unwrap(), None);
        assert_eq!(cache.entry_count(), 0);
        assert!(cache.health_check().await);
    }
}
