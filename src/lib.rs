//! Slug resolution and redirect core of a link shortener.
//!
//! A request for `/{slug}` is validated, answered from an in-process cache when
//! possible, otherwise read from the [`domain::repositories::SlugStore`] under a
//! timeout, and turned into a redirect. Each successful redirect queues a click
//! event that a background worker delivers in batches to a
//! [`domain::repositories::ClickSink`].
//!
//! Layers:
//!
//! - [`domain`] - link records, slug validation, store and sink contracts, click worker
//! - [`application`] - [`application::services::RedirectResolver`] and the analytics recorder
//! - [`infrastructure`] - resolution cache, PostgreSQL and in-memory stores, click sinks
//! - [`api`] - axum handlers and DTOs
//!
//! Wiring from environment variables lives in [`config`] and [`server`].

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Types most callers need, in one import.
pub mod prelude {
    pub use crate::application::services::{
        AnalyticsRecorder, RedirectResolver, Resolution, ResolverOptions,
    };
    pub use crate::domain::click_event::{ClickEvent, ClientMeta};
    pub use crate::domain::entities::{LinkPatch, LinkRecord, NewLink};
    pub use crate::domain::validator::SlugValidator;
    pub use crate::error::AppError;
    pub use crate::state::AppState;
    pub use crate::utils::clock::{Clock, ManualClock, SystemClock};
}
