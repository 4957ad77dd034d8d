//! Resolution cache trait and error types.

use async_trait::async_trait;
use chrono::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// TTL-bounded cache of slug → target in front of the slug store.
///
/// Implementations must be thread-safe and replace values atomically per key:
/// a reader sees one complete write, never a torn value. There is no lock
/// across keys. Errors degrade to store lookups; they never turn into a
/// "not found" answer.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process, LRU-bounded
/// - [`crate::infrastructure::cache::NullCache`] - no-op for disabled caching
#[async_trait]
pub trait ResolutionCache: Send + Sync {
    /// Returns the cached target if present and younger than its TTL.
    ///
    /// A stale entry is reported as a miss and removed.
    ///
    /// # Errors
    ///
    /// Remote backends may return [`CacheError`]; callers treat it as a miss.
    async fn get(&self, slug: &str) -> CacheResult<Option<String>>;

    /// Stores `target` for `slug`, overwriting any existing entry.
    ///
    /// A non-positive `ttl` stores nothing.
    async fn put(&self, slug: &str, target: &str, ttl: Duration) -> CacheResult<()>;

    /// Current invalidation generation of `slug`.
    ///
    /// Read before a store lookup and handed back to [`Self::put_if_current`]
    /// so that a lookup overtaken by a write cannot repopulate the old value.
    fn generation(&self, slug: &str) -> u64;

    /// Like [`Self::put`], but only if no [`Self::invalidate`] of `slug` has
    /// completed since `generation` was read.
    ///
    /// Returns whether the entry was stored.
    async fn put_if_current(
        &self,
        slug: &str,
        target: &str,
        ttl: Duration,
        generation: u64,
    ) -> CacheResult<bool>;

    /// Removes any entry for `slug` immediately and advances its generation.
    async fn invalidate(&self, slug: &str) -> CacheResult<()>;

    /// Approximate number of live entries.
    fn entry_count(&self) -> u64;

    /// Applies pending evictions so that [`Self::entry_count`] is exact.
    fn run_pending_tasks(&self);

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
