//! Infrastructure layer for external integrations.
//!
//! This layer implements the contracts defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Resolution cache (moka-backed and no-op implementations)
//! - [`persistence`] - Slug stores and click sinks (in-memory and PostgreSQL)

pub mod cache;
pub mod persistence;
