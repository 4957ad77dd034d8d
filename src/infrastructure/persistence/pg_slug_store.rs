//! PostgreSQL implementation of the slug store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use url::Url;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::{SlugStore, StoreError};

/// Row shape of the `links` table.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    slug: String,
    target: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    owner_id: Option<String>,
    cache_ttl_seconds: Option<i64>,
}

impl TryFrom<LinkRow> for LinkRecord {
    type Error = StoreError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let target = Url::parse(&row.target).map_err(|e| {
            error!(slug = %row.slug, error = %e, "Stored link has an unparsable target");
            StoreError::Unavailable(format!("corrupt record for slug '{}'", row.slug))
        })?;

        Ok(LinkRecord {
            slug: row.slug,
            target,
            created_at: row.created_at,
            expires_at: row.expires_at,
            owner_id: row.owner_id,
            cache_ttl: row.cache_ttl_seconds.map(Duration::seconds),
        })
    }
}

/// Maps a driver error to the store contract.
///
/// Unique violations become [`StoreError::Conflict`]; everything else is an
/// infrastructure failure.
fn map_sqlx_error(slug: &str, e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return StoreError::Conflict {
            slug: slug.to_string(),
        };
    }

    error!(slug, error = %e, "Slug store query failed");
    StoreError::Unavailable(e.to_string())
}

/// PostgreSQL slug store.
///
/// Put-if-absent relies on `INSERT … ON CONFLICT DO NOTHING` against the
/// primary key, so the uniqueness decision is made by the database.
pub struct PgSlugStore {
    pool: Arc<PgPool>,
}

impl PgSlugStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlugStore for PgSlugStore {
    async fn get(&self, slug: &str) -> Result<Option<LinkRecord>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT slug, target, created_at, expires_at, owner_id, cache_ttl_seconds
            FROM links
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error(slug, e))?;

        row.map(LinkRecord::try_from).transpose()
    }

    async fn put(&self, record: LinkRecord, overwrite: bool) -> Result<(), StoreError> {
        let sql = if overwrite {
            r#"
            INSERT INTO links (slug, target, created_at, expires_at, owner_id, cache_ttl_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (slug) DO UPDATE SET
                target = EXCLUDED.target,
                expires_at = EXCLUDED.expires_at,
                owner_id = EXCLUDED.owner_id,
                cache_ttl_seconds = EXCLUDED.cache_ttl_seconds
            "#
        } else {
            r#"
            INSERT INTO links (slug, target, created_at, expires_at, owner_id, cache_ttl_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (slug) DO NOTHING
            "#
        };

        let result = sqlx::query(sql)
            .bind(&record.slug)
            .bind(record.target.as_str())
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(&record.owner_id)
            .bind(record.cache_ttl.map(|ttl| ttl.num_seconds()))
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error(&record.slug, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict { slug: record.slug });
        }

        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM links WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error(slug, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                slug: slug.to_string(),
            });
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
