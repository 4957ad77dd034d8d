//! Business logic services for the application layer.

pub mod analytics_service;
pub mod resolver_service;

pub use analytics_service::AnalyticsRecorder;
pub use resolver_service::{RedirectResolver, Resolution, ResolverOptions};
