//! Slug store and click sink implementations.
//!
//! # Stores
//!
//! - [`MemorySlugStore`] - In-process concurrent map
//! - [`PgSlugStore`] - PostgreSQL via SQLx
//!
//! # Sinks
//!
//! - [`MemoryClickSink`], [`TracingClickSink`], [`PgClickSink`]

pub mod click_sinks;
pub mod memory_slug_store;
pub mod pg_slug_store;

pub use click_sinks::{MemoryClickSink, PgClickSink, TracingClickSink};
pub use memory_slug_store::MemorySlugStore;
pub use pg_slug_store::PgSlugStore;
