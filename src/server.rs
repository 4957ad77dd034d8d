//! HTTP server initialization and runtime setup.
//!
//! Handles store and sink selection, cache setup, worker spawning, and the
//! Axum server lifecycle including graceful shutdown.

use crate::application::services::{AnalyticsRecorder, RedirectResolver};
use crate::config::Config;
use crate::domain::repositories::{ClickSink, SlugStore};
use crate::infrastructure::cache::{MemoryCache, NullCache, ResolutionCache};
use crate::infrastructure::persistence::{
    MemorySlugStore, PgClickSink, PgSlugStore, TracingClickSink,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::clock::{Clock, SystemClock};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Time allowed for the click worker to flush after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Wires every component from configuration.
///
/// Returns the state and the click worker handle. The worker stops once every
/// clone of the state has been dropped.
///
/// # Errors
///
/// Returns an error if the database is configured but unreachable, migrations
/// fail, or the slug pattern does not compile.
pub async fn build_state(config: &Config) -> Result<(AppState, JoinHandle<()>)> {
    let (store, sink): (Arc<dyn SlugStore>, Arc<dyn ClickSink>) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            let pool = Arc::new(pool);
            (
                Arc::new(PgSlugStore::new(pool.clone())),
                Arc::new(PgClickSink::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, links are kept in memory only");
            (Arc::new(MemorySlugStore::new()), Arc::new(TracingClickSink))
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache: Arc<dyn ResolutionCache> = if config.is_cache_enabled() {
        tracing::info!(max_entries = config.cache_max_entries, "Cache enabled (in-memory)");
        Arc::new(MemoryCache::new(config.cache_max_entries, clock.clone()))
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let (recorder, worker) = AnalyticsRecorder::spawn(
        config.click_queue_capacity,
        sink,
        config.click_worker_options(),
    );

    let validator = config.slug_validator().context("Invalid SLUG_REGEX")?;
    let resolver = RedirectResolver::new(
        store.clone(),
        cache.clone(),
        validator,
        clock,
        config.resolver_options(),
    )
    .with_recorder(recorder.clone());

    let state = AppState::new(Arc::new(resolver), recorder, store, cache)
        .with_redirect_status(config.redirect_status()?);

    Ok((state, worker))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Slug store and click sink (PostgreSQL, or in-memory and log)
/// - Apply migrations
/// - Resolution cache (or NullCache)
/// - Background click worker
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits for the click worker to flush.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (state, worker) = build_state(&config).await?;

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining click queue");
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Click worker drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Click worker panicked"),
        Err(_) => tracing::warn!("Click worker did not drain in time, pending clicks lost"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
