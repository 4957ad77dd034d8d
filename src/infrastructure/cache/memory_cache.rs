//! In-process resolution cache backed by moka.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::{debug, trace};

use super::service::{CacheResult, ResolutionCache};
use crate::utils::clock::Clock;

/// A cached resolution.
///
/// Treated as absent once `now - cached_at >= ttl`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub slug: String,
    pub target: String,
    pub cached_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.cached_at < self.ttl
    }
}

/// Number of generation stripes. Slugs sharing a stripe share a counter.
const GENERATION_STRIPES: usize = 256;

/// Concurrent in-memory cache with per-entry TTL and an LRU size bound.
///
/// Freshness is checked lazily on read against the injected clock; the entry
/// count is bounded independently by moka's LRU eviction, so a long tail of
/// distinct slugs cannot grow memory without limit. Values are stored behind
/// an `Arc` and replaced whole.
///
/// Invalidation generations live in a fixed array of striped counters.
/// `invalidate` bumps the slug's stripe and removes the entry while holding
/// the stripe lock, and `put_if_current` compares and inserts under the same
/// lock, so a populate that read the store before an invalidate can never land
/// after it. A collision on a stripe only skips a populate.
pub struct MemoryCache {
    inner: Cache<String, Arc<CacheEntry>>,
    clock: Arc<dyn Clock>,
    generations: Box<[Mutex<u64>]>,
    hasher: RandomState,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` resolutions.
    pub fn new(max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        debug!(max_entries, "MemoryCache initialized");

        let generations = (0..GENERATION_STRIPES).map(|_| Mutex::new(0)).collect();

        Self {
            inner,
            clock,
            generations,
            hasher: RandomState::new(),
        }
    }

    /// Returns the raw entry, fresh or not.
    ///
    /// Counts as an access for LRU purposes, like any other read.
    pub fn peek(&self, slug: &str) -> Option<CacheEntry> {
        self.inner.get(slug).map(|entry| entry.as_ref().clone())
    }

    fn stripe(&self, slug: &str) -> MutexGuard<'_, u64> {
        let index = (self.hasher.hash_one(slug) as usize) % self.generations.len();
        // The guarded value is a plain counter, so a poisoned lock is still usable.
        self.generations[index]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert(&self, slug: &str, target: &str, ttl: Duration) {
        let entry = CacheEntry {
            slug: slug.to_string(),
            target: target.to_string(),
            cached_at: self.clock.now(),
            ttl,
        };

        self.inner.insert(slug.to_string(), Arc::new(entry));
        trace!(slug, ttl_secs = ttl.num_seconds(), "Cache SET");
    }
}

#[async_trait]
impl ResolutionCache for MemoryCache {
    async fn get(&self, slug: &str) -> CacheResult<Option<String>> {
        let Some(entry) = self.inner.get(slug) else {
            trace!(slug, "Cache MISS");
            return Ok(None);
        };

        if entry.is_fresh_at(self.clock.now()) {
            trace!(slug, "Cache HIT");
            return Ok(Some(entry.target.clone()));
        }

        // A refresh racing with this removal only costs one extra miss.
        self.inner.invalidate(slug);
        debug!(slug, "Cache entry expired, evicted lazily");

        Ok(None)
    }

    async fn put(&self, slug: &str, target: &str, ttl: Duration) -> CacheResult<()> {
        if ttl <= Duration::zero() {
            return Ok(());
        }

        self.insert(slug, target, ttl);
        Ok(())
    }

    fn generation(&self, slug: &str) -> u64 {
        *self.stripe(slug)
    }

    async fn put_if_current(
        &self,
        slug: &str,
        target: &str,
        ttl: Duration,
        generation: u64,
    ) -> CacheResult<bool> {
        if ttl <= Duration::zero() {
            return Ok(false);
        }

        let current = self.stripe(slug);
        if *current != generation {
            debug!(slug, "Slug invalidated during lookup, skipping populate");
            return Ok(false);
        }

        self.insert(slug, target, ttl);
        Ok(true)
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        let mut current = self.stripe(slug);
        *current = current.wrapping_add(1);
        self.inner.invalidate(slug);
        drop(current);

        trace!(slug, "Cache INVALIDATE");
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;

    fn cache_with_clock(max_entries: u64) -> (MemoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (MemoryCache::new(max_entries, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (cache, _) = cache_with_clock(100);

        cache
            .put("abc", "https://example.com/", Duration::seconds(300))
            .await
            .unwrap();

        assert_eq!(
            cache.get("abc").await.unwrap().as_deref(),
            Some("https://example.com/")
        );
    }

    #[tokio::test]
    async fn test_miss() {
        let (cache, _) = cache_with_clock(100);
        assert_eq!(cache.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (cache, clock) = cache_with_clock(100);

        cache
            .put("abc", "https://example.com/", Duration::seconds(300))
            .await
            .unwrap();

        clock.advance(Duration::seconds(299));
        assert!(cache.get("abc").await.unwrap().is_some());

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get("abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stale_entry_removed_on_read() {
        let (cache, clock) = cache_with_clock(100);

        cache
            .put("abc", "https://example.com/", Duration::seconds(10))
            .await
            .unwrap();
        clock.advance(Duration::seconds(11));

        assert_eq!(cache.get("abc").await.unwrap(), None);
        assert!(cache.peek("abc").is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_last_writer_wins() {
        let (cache, _) = cache_with_clock(100);

        cache
            .put("abc", "https://one.example/", Duration::seconds(60))
            .await
            .unwrap();
        cache
            .put("abc", "https://two.example/", Duration::seconds(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("abc").await.unwrap().as_deref(),
            Some("https://two.example/")
        );
    }

    #[tokio::test]
    async fn test_overwrite_resets_cached_at() {
        let (cache, clock) = cache_with_clock(100);

        cache
            .put("abc", "https://example.com/", Duration::seconds(10))
            .await
            .unwrap();
        clock.advance(Duration::seconds(8));
        cache
            .put("abc", "https://example.com/", Duration::seconds(10))
            .await
            .unwrap();
        clock.advance(Duration::seconds(8));

        assert!(cache.get("abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (cache, _) = cache_with_clock(100);

        cache
            .put("abc", "https://example.com/", Duration::seconds(60))
            .await
            .unwrap();
        cache.invalidate("abc").await.unwrap();

        assert_eq!(cache.get("abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_if_current_stores_when_untouched() {
        let (cache, _) = cache_with_clock(100);

        let generation = cache.generation("abc");
        let stored = cache
            .put_if_current("abc", "https://example.com/", Duration::seconds(60), generation)
            .await
            .unwrap();

        assert!(stored);
        assert!(cache.get("abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_if_current_skips_after_invalidate() {
        let (cache, _) = cache_with_clock(100);

        let generation = cache.generation("abc");
        cache.invalidate("abc").await.unwrap();

        let stored = cache
            .put_if_current("abc", "https://old.example/", Duration::seconds(60), generation)
            .await
            .unwrap();

        assert!(!stored);
        assert_eq!(cache.get("abc").await.unwrap(), None);

        let fresh = cache.generation("abc");
        assert!(
            cache
                .put_if_current("abc", "https://new.example/", Duration::seconds(60), fresh)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_zero_ttl_is_not_stored() {
        let (cache, _) = cache_with_clock(100);

        cache
            .put("abc", "https://example.com/", Duration::zero())
            .await
            .unwrap();

        assert!(cache.peek("abc").is_none());
    }

    #[tokio::test]
    async fn test_entry_count_is_bounded() {
        let (cache, _) = cache_with_clock(50);

        for i in 0..1_000 {
            cache
                .put(
                    &format!("slug-{i}"),
                    "https://example.com/",
                    Duration::seconds(300),
                )
                .await
                .unwrap();
        }
        cache.run_pending_tasks();

        assert!(cache.entry_count() <= 50);
    }

    #[tokio::test]
    async fn test_concurrent_writers_never_tear() {
        let (cache, _) = cache_with_clock(100);
        let cache = Arc::new(cache);

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let target = format!("https://example.com/{i}");
                cache
                    .put("shared", &target, Duration::seconds(60))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entry = cache.peek("shared").unwrap();
        let suffix = entry.target.trim_start_matches("https://example.com/");
        assert!(suffix.parse::<u32>().unwrap() < 16);
        assert_eq!(entry.slug, "shared");
    }
}
