//! Slug resolution and the link write path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use metrics::counter;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::application::services::AnalyticsRecorder;
use crate::domain::click_event::{ClickEvent, ClientMeta};
use crate::domain::entities::{LinkPatch, LinkRecord, MAX_TTL_SECONDS, NewLink};
use crate::domain::repositories::{SlugStore, StoreError};
use crate::domain::validator::SlugValidator;
use crate::error::AppError;
use crate::infrastructure::cache::ResolutionCache;
use crate::utils::clock::Clock;
use crate::utils::code_generator::generate_slug;
use crate::utils::url_normalizer::parse_target;

/// Attempts at finding a free generated slug before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Tuning for [`RedirectResolver`], built once from configuration.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Cache lifetime for links created without their own ttl.
    pub default_ttl: Duration,
    /// Upper bound for a single store call.
    pub store_timeout: StdDuration,
    /// When false, slugs are lowercased before storage and lookup.
    pub case_sensitive: bool,
    /// Length of generated slugs.
    pub slug_length: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            default_ttl: Duration::seconds(300),
            store_timeout: StdDuration::from_millis(500),
            case_sensitive: false,
            slug_length: 6,
        }
    }
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub slug: String,
    pub target: String,
}

/// Resolves slugs to targets through the cache and owns every store write.
///
/// # Read path
///
/// Format check, then cache, then store (bounded by the store timeout). Store
/// failures and timeouts surface as [`AppError::Unavailable`] and are never
/// cached. Expired links are reported as [`AppError::Expired`] and never
/// cached either.
///
/// Concurrent misses on the same slug each query the store and each populate
/// the cache. There is no per-slug request coalescing. A populate is dropped if
/// the slug was invalidated after its store lookup began, so a lookup that
/// overlaps a write never reinstates the old target.
///
/// # Write path
///
/// Every successful store write is followed by a cache invalidation of that
/// slug. Writes never populate the cache.
pub struct RedirectResolver {
    store: Arc<dyn SlugStore>,
    cache: Arc<dyn ResolutionCache>,
    validator: SlugValidator,
    clock: Arc<dyn Clock>,
    options: ResolverOptions,
    recorder: Option<AnalyticsRecorder>,
}

impl RedirectResolver {
    pub fn new(
        store: Arc<dyn SlugStore>,
        cache: Arc<dyn ResolutionCache>,
        validator: SlugValidator,
        clock: Arc<dyn Clock>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            store,
            cache,
            validator,
            clock,
            options,
            recorder: None,
        }
    }

    /// Attaches the recorder used by [`Self::resolve_and_record`].
    pub fn with_recorder(mut self, recorder: AnalyticsRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn validator(&self) -> &SlugValidator {
        &self.validator
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Applies the case rule.
    pub fn canonicalize(&self, raw: &str) -> String {
        if self.options.case_sensitive {
            raw.to_string()
        } else {
            raw.to_lowercase()
        }
    }

    /// Resolves a slug to its target.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidFormat`] - slug fails the pattern, or the stored
    ///   record is corrupt
    /// - [`AppError::NotFound`] - no such slug
    /// - [`AppError::Expired`] - link is past its expiry
    /// - [`AppError::Unavailable`] - store failed or timed out
    pub async fn resolve(&self, raw_slug: &str) -> Result<Resolution, AppError> {
        let slug = self.canonicalize(raw_slug);
        self.validator.validate_format(&slug)?;

        match self.cache.get(&slug).await {
            Ok(Some(target)) => {
                counter!("redirect_cache_hits_total").increment(1);
                debug!(slug = %slug, "Resolved from cache");
                return Ok(Resolution { slug, target });
            }
            Ok(None) => {}
            Err(e) => warn!(slug = %slug, error = %e, "Cache read failed, falling back to store"),
        }
        counter!("redirect_cache_misses_total").increment(1);

        let generation = self.cache.generation(&slug);
        let record = self
            .with_timeout(self.store.get(&slug))
            .await?
            .ok_or_else(|| AppError::NotFound { slug: slug.clone() })?;

        let now = self.clock.now();
        if record.is_expired_at(now) {
            debug!(slug = %slug, "Link expired");
            return Err(AppError::Expired { slug });
        }

        if self.validator.validate_format(&record.slug).is_err() {
            error!(slug = %slug, stored_slug = %record.slug, "Store returned a record with an invalid slug");
            return Err(AppError::InvalidFormat { slug });
        }

        let mut ttl = record.cache_ttl.unwrap_or(self.options.default_ttl);
        if let Some(remaining) = record.remaining_lifetime(now) {
            ttl = ttl.min(remaining);
        }

        let target = record.target.to_string();
        if let Err(e) = self
            .cache
            .put_if_current(&slug, &target, ttl, generation)
            .await
        {
            warn!(slug = %slug, error = %e, "Failed to populate cache");
        }

        debug!(slug = %slug, "Resolved from store");
        Ok(Resolution { slug, target })
    }

    /// Resolves and, on success, hands a click event to the recorder.
    ///
    /// Recording never affects the result.
    pub async fn resolve_and_record(
        &self,
        raw_slug: &str,
        client: ClientMeta,
    ) -> Result<Resolution, AppError> {
        let resolution = self.resolve(raw_slug).await?;

        if let Some(recorder) = &self.recorder {
            recorder.record(ClickEvent::new(
                resolution.slug.clone(),
                self.clock.now(),
                client,
            ));
        }

        Ok(resolution)
    }

    /// Creates a link.
    ///
    /// With an explicit slug, a collision is returned as
    /// [`AppError::Conflict`]. Without one, random slugs are tried until one is
    /// free, up to a fixed number of attempts.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidTarget`] - target is not an absolute HTTP(S) URL
    /// - [`AppError::InvalidFormat`] / [`AppError::Reserved`] - explicit slug rejected
    /// - [`AppError::Validation`] - ttl outside `1..=MAX_TTL_SECONDS`
    /// - [`AppError::Conflict`] - explicit slug already taken
    /// - [`AppError::Unavailable`] - store failure, or no free slug found
    pub async fn create(&self, new_link: NewLink) -> Result<LinkRecord, AppError> {
        let target = parse_target(&new_link.target)?;
        if let Some(ttl) = new_link.ttl {
            ensure_valid_ttl(ttl)?;
        }

        let now = self.clock.now();
        let build = |slug: String| {
            LinkRecord::new(slug, target.clone(), now)
                .with_expires_at(new_link.expires_at)
                .with_owner(new_link.owner_id.clone())
                .with_cache_ttl(new_link.ttl)
        };

        let record = match new_link.slug.as_deref() {
            Some(raw) => {
                let slug = self.canonicalize(raw);
                self.validator.validate(&slug)?;

                let record = build(slug);
                self.with_timeout(self.store.put(record.clone(), false))
                    .await?;
                record
            }
            None => self.insert_generated(build).await?,
        };

        self.invalidate(&record.slug).await;
        info!(slug = %record.slug, target = %record.target, "Link created");

        Ok(record)
    }

    /// Returns the stored record without checking expiry.
    pub async fn get_link(&self, raw_slug: &str) -> Result<LinkRecord, AppError> {
        let slug = self.canonicalize(raw_slug);
        self.validator.validate_format(&slug)?;

        self.with_timeout(self.store.get(&slug))
            .await?
            .ok_or(AppError::NotFound { slug })
    }

    /// Applies a partial update and invalidates the cached resolution.
    pub async fn update(&self, raw_slug: &str, patch: LinkPatch) -> Result<LinkRecord, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "slug": raw_slug }),
            ));
        }

        let mut record = self.get_link(raw_slug).await?;

        if let Some(target) = &patch.target {
            record.target = parse_target(target)?;
        }
        if let Some(expires_at) = patch.expires_at {
            record.expires_at = expires_at;
        }
        if let Some(ttl) = patch.ttl {
            if let Some(ttl) = ttl {
                ensure_valid_ttl(ttl)?;
            }
            record.cache_ttl = ttl;
        }

        self.with_timeout(self.store.put(record.clone(), true))
            .await?;
        self.invalidate(&record.slug).await;
        info!(slug = %record.slug, "Link updated");

        Ok(record)
    }

    /// Deletes a link and invalidates the cached resolution.
    pub async fn delete(&self, raw_slug: &str) -> Result<(), AppError> {
        let slug = self.canonicalize(raw_slug);
        self.validator.validate_format(&slug)?;

        self.with_timeout(self.store.delete(&slug)).await?;
        self.invalidate(&slug).await;
        info!(slug = %slug, "Link deleted");

        Ok(())
    }

    async fn insert_generated<F>(&self, build: F) -> Result<LinkRecord, AppError>
    where
        F: Fn(String) -> LinkRecord,
    {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let slug = self.canonicalize(&generate_slug(self.options.slug_length));
            if self.validator.validate(&slug).is_err() {
                debug!(slug = %slug, attempt, "Generated slug rejected by validator");
                continue;
            }

            let record = build(slug);
            match self.with_timeout(self.store.put(record.clone(), false)).await {
                Ok(()) => return Ok(record),
                Err(AppError::Conflict { slug }) => {
                    debug!(slug = %slug, attempt, "Generated slug collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            length = self.options.slug_length,
            "Slug space exhausted"
        );
        Err(AppError::unavailable("slug space exhausted"))
    }

    async fn invalidate(&self, slug: &str) {
        if let Err(e) = self.cache.invalidate(slug).await {
            warn!(slug, error = %e, "Failed to invalidate cache entry");
        }
    }

    /// Runs a store call under the store timeout.
    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.options.store_timeout, call).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                warn!(
                    timeout_ms = self.options.store_timeout.as_millis() as u64,
                    "Slug store call timed out"
                );
                Err(AppError::unavailable("store timeout"))
            }
        }
    }
}

fn ensure_valid_ttl(ttl: Duration) -> Result<(), AppError> {
    if ttl <= Duration::zero() || ttl > Duration::seconds(MAX_TTL_SECONDS) {
        return Err(AppError::bad_request(
            format!("ttl must be between 1 and {MAX_TTL_SECONDS} seconds"),
            json!({ "ttl": ttl.num_seconds() }),
        ));
    }
    Ok(())
}
