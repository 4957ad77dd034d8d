//! Non-blocking entry point for click analytics.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::{ClickWorkerOptions, run_click_worker};
use crate::domain::repositories::ClickSink;

/// Handle used by the redirect path to hand click events off.
///
/// [`AnalyticsRecorder::record`] never blocks and never fails the caller: if
/// the queue is full or the worker is gone the event is dropped and counted.
/// Delivery is best-effort and happens entirely off the response path.
#[derive(Clone)]
pub struct AnalyticsRecorder {
    sender: mpsc::Sender<ClickEvent>,
}

impl AnalyticsRecorder {
    /// Wraps an existing channel. The caller owns the receiving side.
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self { sender }
    }

    /// Creates the queue and spawns [`run_click_worker`] on it.
    ///
    /// The worker stops after every clone of the returned recorder is dropped
    /// and its buffer has been flushed; await the handle for a clean shutdown.
    pub fn spawn(
        capacity: usize,
        sink: Arc<dyn ClickSink>,
        options: ClickWorkerOptions,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_click_worker(receiver, sink, options));

        (Self { sender }, handle)
    }

    /// Enqueues an event, taking ownership of it.
    pub fn record(&self, event: ClickEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                counter!("clicks_dropped_total").increment(1);
                debug!(slug = %event.slug, "Click queue full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                counter!("clicks_dropped_total").increment(1);
                warn!(slug = %event.slug, "Click queue closed, dropping event");
            }
        }
    }

    /// Returns true once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Total queue size.
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}
