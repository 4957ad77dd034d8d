#![allow(dead_code)]

use chrono::{Duration, Utc};
use link_resolver::application::services::{AnalyticsRecorder, RedirectResolver, ResolverOptions};
use link_resolver::domain::click_event::ClickEvent;
use link_resolver::domain::entities::LinkRecord;
use link_resolver::domain::repositories::SlugStore;
use link_resolver::domain::validator::{DEFAULT_SLUG_PATTERN, SlugValidator};
use link_resolver::infrastructure::cache::{MemoryCache, ResolutionCache};
use link_resolver::infrastructure::persistence::MemorySlugStore;
use link_resolver::state::AppState;
use link_resolver::utils::clock::{Clock, ManualClock};
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// Everything a test needs to drive and inspect the service.
pub struct TestContext {
    pub state: AppState,
    pub clicks: mpsc::Receiver<ClickEvent>,
    pub store: Arc<dyn SlugStore>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
}

pub fn validator() -> SlugValidator {
    SlugValidator::new(DEFAULT_SLUG_PATTERN, ["dashboard"], 64).unwrap()
}

/// In-memory wiring with a manual clock and the default 300 s cache ttl.
pub fn create_test_context() -> TestContext {
    create_test_context_with_store(Arc::new(MemorySlugStore::new()))
}

pub fn create_test_context_with_store(store: Arc<dyn SlugStore>) -> TestContext {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(MemoryCache::new(1_000, clock.clone()));
    let (tx, clicks) = mpsc::channel(100);
    let recorder = AnalyticsRecorder::new(tx);

    let resolver = RedirectResolver::new(
        store.clone(),
        cache.clone() as Arc<dyn ResolutionCache>,
        validator(),
        clock.clone() as Arc<dyn Clock>,
        ResolverOptions::default(),
    )
    .with_recorder(recorder.clone());

    let state = AppState::new(
        Arc::new(resolver),
        recorder,
        store.clone(),
        cache.clone(),
    );

    TestContext {
        state,
        clicks,
        store,
        cache,
        clock,
    }
}

pub async fn create_test_link(store: &dyn SlugStore, slug: &str, url: &str) {
    store
        .put(
            LinkRecord::new(slug, Url::parse(url).unwrap(), Utc::now()),
            false,
        )
        .await
        .unwrap();
}

pub async fn create_expired_link(ctx: &TestContext, slug: &str, url: &str) {
    let now = ctx.clock.now();
    ctx.store
        .put(
            LinkRecord::new(slug, Url::parse(url).unwrap(), now - Duration::hours(2))
                .with_expires_at(Some(now - Duration::hours(1))),
            false,
        )
        .await
        .unwrap();
}
