//! Core domain entities.
//!
//! - [`LinkRecord`] - A slug mapped to its destination
//! - [`NewLink`] - Input for the creation path
//! - [`LinkPatch`] - Partial update for the edit path

pub mod link;

pub use link::{LinkPatch, LinkRecord, MAX_TTL_SECONDS, NewLink};
