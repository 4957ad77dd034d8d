//! Application layer services.
//!
//! Services orchestrate the validator, cache and store contracts and give the
//! HTTP handlers a single entry point per operation.
//!
//! # Available Services
//!
//! - [`services::resolver_service::RedirectResolver`] - Resolution, creation, edit and delete
//! - [`services::analytics_service::AnalyticsRecorder`] - Non-blocking click ingestion
pub mod services;
