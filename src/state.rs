//! Shared application state for HTTP handlers.

use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::services::{AnalyticsRecorder, RedirectResolver};
use crate::domain::repositories::SlugStore;
use crate::infrastructure::cache::ResolutionCache;

/// State cloned into every handler.
///
/// All fields are cheap to clone. `store` and `cache` are the same instances
/// the resolver holds; handlers only use them for health checks.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RedirectResolver>,
    pub recorder: AnalyticsRecorder,
    pub store: Arc<dyn SlugStore>,
    pub cache: Arc<dyn ResolutionCache>,
    /// Status used for successful redirects.
    pub redirect_status: StatusCode,
}

impl AppState {
    pub fn new(
        resolver: Arc<RedirectResolver>,
        recorder: AnalyticsRecorder,
        store: Arc<dyn SlugStore>,
        cache: Arc<dyn ResolutionCache>,
    ) -> Self {
        Self {
            resolver,
            recorder,
            store,
            cache,
            redirect_status: StatusCode::TEMPORARY_REDIRECT,
        }
    }

    pub fn with_redirect_status(mut self, status: StatusCode) -> Self {
        self.redirect_status = status;
        self
    }
}
