//! Contract for the downstream analytics receiver.

use crate::domain::click_event::ClickEvent;
use async_trait::async_trait;

/// Errors reported by a [`ClickSink`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// Worth retrying with backoff.
    #[error("transient sink failure: {0}")]
    Transient(String),

    /// The batch will never be accepted; retrying is pointless.
    #[error("sink rejected batch: {0}")]
    Rejected(String),
}

impl SinkError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Append-only receiver of click batches.
///
/// Delivery is retried on transient failure, so a batch may arrive more than
/// once. Sinks that cannot tolerate duplicate counts return `false` from
/// [`ClickSink::count_tolerant`], which makes the worker deduplicate events by
/// `(slug, timestamp, nonce)` before delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickSink: Send + Sync {
    /// Appends a batch of events.
    ///
    /// # Errors
    ///
    /// [`SinkError::Transient`] for failures worth retrying,
    /// [`SinkError::Rejected`] for permanent ones.
    async fn append(&self, batch: Vec<ClickEvent>) -> Result<(), SinkError>;

    /// Whether duplicate deliveries are harmless for this sink.
    fn count_tolerant(&self) -> bool;
}
