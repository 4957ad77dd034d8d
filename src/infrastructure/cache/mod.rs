//! Caching layer for fast redirect lookups.
//!
//! Provides a [`ResolutionCache`] trait with two implementations:
//! - [`MemoryCache`] - moka-backed, LRU-bounded, TTL judged against a [`crate::utils::clock::Clock`]
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod service;

pub use memory_cache::{CacheEntry, MemoryCache};
pub use null_cache::NullCache;
pub use service::{CacheError, CacheResult, ResolutionCache};
