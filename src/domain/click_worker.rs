//! Background worker that batches click events and delivers them to a sink.
//!
//! Events arrive over a bounded channel fed by
//! [`crate::application::services::AnalyticsRecorder`]. The worker flushes when
//! a batch fills up, when the flush interval elapses, and once more when the
//! channel closes. Delivery is at-least-once within the retry budget; after
//! that the batch is dropped and counted.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use moka::sync::Cache;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::{ClickEvent, EventKey};
use crate::domain::repositories::{ClickSink, SinkError};

/// Tuning knobs for [`run_click_worker`].
#[derive(Debug, Clone)]
pub struct ClickWorkerOptions {
    /// Flush as soon as this many events are buffered.
    pub batch_size: usize,
    /// Flush at least this often while events are buffered.
    pub flush_interval: Duration,
    /// Retries after the first failed delivery of a batch.
    pub max_retries: usize,
    /// First backoff delay; doubles per retry.
    pub retry_base_delay: Duration,
    /// Upper bound for a single backoff delay.
    pub retry_max_delay: Duration,
    /// Number of delivered event keys remembered for deduplication.
    pub dedup_capacity: u64,
}

impl Default for ClickWorkerOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval: Duration::from_secs(1),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(100),
            retry_max_delay: Duration::from_secs(5),
            dedup_capacity: 100_000,
        }
    }
}

/// Remembers recently delivered event keys.
///
/// Bounded by capacity, so memory stays flat under sustained traffic; an
/// evicted key can in principle be delivered twice, which is acceptable for
/// a window measured in hundreds of thousands of events.
struct Deduplicator {
    delivered: Cache<EventKey, ()>,
}

impl Deduplicator {
    fn new(capacity: u64) -> Self {
        Self {
            delivered: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Drops events already delivered or repeated within `batch`.
    fn filter(&self, batch: Vec<ClickEvent>) -> Vec<ClickEvent> {
        let mut seen = HashSet::with_capacity(batch.len());

        batch
            .into_iter()
            .filter(|event| {
                let key = event.key();
                !self.delivered.contains_key(&key) && seen.insert(key)
            })
            .collect()
    }

    fn mark_delivered(&self, batch: &[ClickEvent]) {
        for event in batch {
            self.delivered.insert(event.key(), ());
        }
    }
}

/// Runs until the sending side of `rx` is dropped, then flushes what is left.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    sink: Arc<dyn ClickSink>,
    options: ClickWorkerOptions,
) {
    let dedup = (!sink.count_tolerant()).then(|| Deduplicator::new(options.dedup_capacity));
    let batch_size = options.batch_size.max(1);
    let mut batch: Vec<ClickEvent> = Vec::with_capacity(batch_size);

    let mut ticker = tokio::time::interval(options.flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    info!(
        batch_size,
        flush_interval_ms = options.flush_interval.as_millis() as u64,
        dedup = dedup.is_some(),
        "Click worker started"
    );

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(event) => {
                    batch.push(event);
                    if batch.len() >= batch_size {
                        let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                        deliver(&sink, full, dedup.as_ref(), &options).await;
                    }
                }
                None => {
                    if !batch.is_empty() {
                        deliver(&sink, std::mem::take(&mut batch), dedup.as_ref(), &options).await;
                    }
                    info!("Click queue closed, worker stopped");
                    break;
                }
            },
            _ = ticker.tick() => {
                if !batch.is_empty() {
                    let pending = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                    deliver(&sink, pending, dedup.as_ref(), &options).await;
                }
            }
        }
    }
}

/// Delivers one batch with retry; never propagates failure.
async fn deliver(
    sink: &Arc<dyn ClickSink>,
    batch: Vec<ClickEvent>,
    dedup: Option<&Deduplicator>,
    options: &ClickWorkerOptions,
) {
    let batch = match dedup {
        Some(dedup) => dedup.filter(batch),
        None => batch,
    };

    if batch.is_empty() {
        return;
    }

    let size = batch.len();
    let base_ms = options.retry_base_delay.as_millis().max(1) as u64;
    // 2^n * (base / 2) => base, 2*base, 4*base, ...
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(base_ms.div_ceil(2))
        .max_delay(options.retry_max_delay)
        .map(jitter)
        .take(options.max_retries);

    let result = RetryIf::start(
        strategy,
        || {
            let sink = Arc::clone(sink);
            let batch = batch.clone();
            async move {
                let result = sink.append(batch).await;
                if let Err(ref e) = result {
                    debug!(error = %e, "Click batch delivery attempt failed");
                }
                result
            }
        },
        SinkError::is_transient,
    )
    .await;

    match result {
        Ok(()) => {
            counter!("clicks_recorded_total").increment(size as u64);
            if let Some(dedup) = dedup {
                dedup.mark_delivered(&batch);
            }
            debug!(size, "Click batch delivered");
        }
        Err(e) => {
            counter!("click_batches_failed_total").increment(1);
            counter!("clicks_dropped_total").increment(size as u64);
            warn!(size, error = %e, "Dropping click batch after exhausting retries");
        }
    }
}
