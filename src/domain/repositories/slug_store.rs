//! Key-value contract for link persistence.

use crate::domain::entities::LinkRecord;
use async_trait::async_trait;

/// Errors reported by a [`SlugStore`].
///
/// `Unavailable` covers every infrastructure failure and must never be
/// interpreted as "slug does not exist".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("slug '{slug}' already exists")]
    Conflict { slug: String },

    #[error("slug '{slug}' not found")]
    NotFound { slug: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable mapping from slug to [`LinkRecord`]; the single source of truth.
///
/// Implementations must give read-after-write consistency for a single key:
/// a `put` followed by a `get` of the same slug from the same caller observes
/// the write. Put-if-absent (`overwrite = false`) must be atomic so that two
/// concurrent creations of one slug yield exactly one success.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemorySlugStore`] - in-process map
/// - [`crate::infrastructure::persistence::PgSlugStore`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlugStore: Send + Sync {
    /// Looks up a slug.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on infrastructure failure.
    async fn get(&self, slug: &str) -> Result<Option<LinkRecord>, StoreError>;

    /// Writes a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the slug exists and `overwrite` is
    /// false. Returns [`StoreError::Unavailable`] on infrastructure failure.
    async fn put(&self, record: LinkRecord, overwrite: bool) -> Result<(), StoreError>;

    /// Removes a slug.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the slug does not exist.
    async fn delete(&self, slug: &str) -> Result<(), StoreError>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
