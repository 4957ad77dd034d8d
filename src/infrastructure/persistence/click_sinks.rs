//! Click sink implementations.
//!
//! - [`MemoryClickSink`] - collects batches in memory (tests, embedding)
//! - [`TracingClickSink`] - logs batches when no database is configured
//! - [`PgClickSink`] - appends to the `link_clicks` table

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickSink, SinkError};

/// Sink that keeps every delivered event in memory.
///
/// Declares itself count-sensitive unless built with
/// [`MemoryClickSink::count_tolerant`], so the worker deduplicates for it.
#[derive(Default)]
pub struct MemoryClickSink {
    events: Mutex<Vec<ClickEvent>>,
    tolerant: bool,
}

impl MemoryClickSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts duplicate deliveries.
    pub fn count_tolerant() -> Self {
        Self {
            events: Mutex::default(),
            tolerant: true,
        }
    }

    /// Snapshot of everything delivered so far.
    pub fn events(&self) -> Vec<ClickEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClickSink for MemoryClickSink {
    async fn append(&self, batch: Vec<ClickEvent>) -> Result<(), SinkError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| SinkError::Rejected("memory sink poisoned".to_string()))?;
        events.extend(batch);
        Ok(())
    }

    fn count_tolerant(&self) -> bool {
        self.tolerant
    }
}

/// Sink that writes one structured log line per event.
///
/// Logs tolerate duplicates, so no deduplication is requested.
#[derive(Default)]
pub struct TracingClickSink;

#[async_trait]
impl ClickSink for TracingClickSink {
    async fn append(&self, batch: Vec<ClickEvent>) -> Result<(), SinkError> {
        for event in &batch {
            info!(
                target: "clicks",
                slug = %event.slug,
                timestamp = %event.timestamp,
                nonce = event.nonce,
                referrer = event.client.referrer.as_deref().unwrap_or(""),
                country = event.client.country.as_deref().unwrap_or(""),
                user_agent_class = event.client.user_agent_class.as_str(),
                "click"
            );
        }
        Ok(())
    }

    fn count_tolerant(&self) -> bool {
        true
    }
}

/// PostgreSQL click sink.
///
/// Each batch is a single multi-row insert. The `(slug, clicked_at, nonce)`
/// unique constraint with `ON CONFLICT DO NOTHING` makes redelivery harmless,
/// so this sink is count-tolerant.
pub struct PgClickSink {
    pool: Arc<PgPool>,
}

impl PgClickSink {
    /// Creates a new sink with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Splits driver errors into retryable and permanent ones.
fn classify_sqlx_error(e: sqlx::Error) -> SinkError {
    match e {
        sqlx::Error::Database(db) => SinkError::Rejected(db.to_string()),
        sqlx::Error::Encode(_) | sqlx::Error::ColumnNotFound(_) | sqlx::Error::TypeNotFound { .. } => {
            SinkError::Rejected(e.to_string())
        }
        other => SinkError::Transient(other.to_string()),
    }
}

#[async_trait]
impl ClickSink for PgClickSink {
    async fn append(&self, batch: Vec<ClickEvent>) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO link_clicks (slug, clicked_at, nonce, referrer, country, user_agent_class) ",
        );

        builder.push_values(&batch, |mut row, event| {
            row.push_bind(&event.slug)
                .push_bind(event.timestamp)
                // Stored bit-for-bit; only equality matters.
                .push_bind(event.nonce as i64)
                .push_bind(&event.client.referrer)
                .push_bind(&event.client.country)
                .push_bind(event.client.user_agent_class.as_str());
        });
        builder.push(" ON CONFLICT ON CONSTRAINT uq_link_clicks_event DO NOTHING");

        builder
            .build()
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| {
                error!(error = %e, size = batch.len(), "Failed to append click batch");
                classify_sqlx_error(e)
            })?;

        Ok(())
    }

    fn count_tolerant(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::click_event::ClientMeta;
    use chrono::Utc;

    fn event(slug: &str) -> ClickEvent {
        ClickEvent::new(slug, Utc::now(), ClientMeta::anonymous())
    }

    #[tokio::test]
    async fn test_memory_sink_collects() {
        let sink = MemoryClickSink::new();

        sink.append(vec![event("a"), event("b")]).await.unwrap();
        sink.append(vec![event("c")]).await.unwrap();

        let slugs: Vec<String> = sink.events().into_iter().map(|e| e.slug).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert!(!sink.count_tolerant());
    }

    #[tokio::test]
    async fn test_memory_sink_tolerant_variant() {
        assert!(MemoryClickSink::count_tolerant().count_tolerant());
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_everything() {
        let sink = TracingClickSink;
        assert!(sink.append(vec![event("a")]).await.is_ok());
        assert!(sink.count_tolerant());
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(classify_sqlx_error(sqlx::Error::PoolTimedOut).is_transient());
        assert!(classify_sqlx_error(sqlx::Error::PoolClosed).is_transient());
    }
}
