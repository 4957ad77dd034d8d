//! Contracts for the external collaborators of the resolution core.
//!
//! # Architecture
//!
//! - Traits define the contract; implementations live in
//!   `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for unit tests
//!
//! # Available Contracts
//!
//! - [`SlugStore`] - Durable slug → link record mapping
//! - [`ClickSink`] - Append-only receiver of click batches

pub mod click_sink;
pub mod slug_store;

pub use click_sink::{ClickSink, SinkError};
pub use slug_store::{SlugStore, StoreError};

#[cfg(test)]
pub use click_sink::MockClickSink;
#[cfg(test)]
pub use slug_store::MockSlugStore;
