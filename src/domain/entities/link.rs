//! Link entity representing a slug → destination mapping.

use chrono::{DateTime, Duration, Utc};
use url::Url;

/// Longest accepted per-link cache ttl, in seconds (ten years).
pub const MAX_TTL_SECONDS: i64 = 315_360_000;

/// A stored short link.
///
/// `slug` is unique in the store and always satisfies the slug pattern at the
/// time of creation. `cache_ttl` only governs how long a resolution may be
/// served from cache; it never affects whether the link itself is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub slug: String,
    pub target: Url,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
    pub cache_ttl: Option<Duration>,
}

impl LinkRecord {
    /// Creates a record with no expiry, owner, or cache TTL override.
    pub fn new(slug: impl Into<String>, target: Url, created_at: DateTime<Utc>) -> Self {
        Self {
            slug: slug.into(),
            target,
            created_at,
            expires_at: None,
            owner_id: None,
            cache_ttl: None,
        }
    }

    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_owner(mut self, owner_id: Option<String>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Option<Duration>) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Returns true if the link is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Time left before expiry, `None` when the link never expires.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at.map(|e| e - now)
    }
}

/// Input for creating a link.
///
/// When `slug` is `None` the resolver generates one.
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub slug: Option<String>,
    pub target: String,
    pub ttl: Option<Duration>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
}

impl NewLink {
    pub fn new(slug: Option<String>, target: impl Into<String>) -> Self {
        Self {
            slug,
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
/// `ttl` follows the same convention.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub target: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub ttl: Option<Option<Duration>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.target.is_none() && self.expires_at.is_none() && self.ttl.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = LinkRecord::new("abc123", url("https://example.com"), now);

        assert_eq!(link.slug, "abc123");
        assert_eq!(link.target.as_str(), "https://example.com/");
        assert_eq!(link.created_at, now);
        assert!(link.expires_at.is_none());
        assert!(link.owner_id.is_none());
        assert!(link.cache_ttl.is_none());
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let now = Utc::now();
        let link = LinkRecord::new("code", url("https://example.com"), now);

        assert!(!link.is_expired_at(now + Duration::days(3650)));
        assert!(link.remaining_lifetime(now).is_none());
    }

    #[test]
    fn test_link_is_expired_at_boundary() {
        let now = Utc::now();
        let link = LinkRecord::new("code", url("https://example.com"), now)
            .with_expires_at(Some(now + Duration::seconds(10)));

        assert!(!link.is_expired_at(now + Duration::seconds(9)));
        assert!(link.is_expired_at(now + Duration::seconds(10)));
        assert_eq!(link.remaining_lifetime(now), Some(Duration::seconds(10)));
    }

    #[test]
    fn test_builder_helpers() {
        let link = LinkRecord::new("x", url("https://example.com"), Utc::now())
            .with_owner(Some("user-1".to_string()))
            .with_cache_ttl(Some(Duration::seconds(60)));

        assert_eq!(link.owner_id.as_deref(), Some("user-1"));
        assert_eq!(link.cache_ttl, Some(Duration::seconds(60)));
    }

    #[test]
    fn test_new_link_defaults() {
        let new_link = NewLink::new(None, "https://rust-lang.org");

        assert!(new_link.slug.is_none());
        assert_eq!(new_link.target, "https://rust-lang.org");
        assert!(new_link.ttl.is_none());
        assert!(new_link.expires_at.is_none());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(LinkPatch::default().is_empty());
        assert!(
            !LinkPatch {
                expires_at: Some(None),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
