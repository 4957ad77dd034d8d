//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// `GET /health`
///
/// 200 when the store answers, the click queue is open and the cache is
/// healthy; 503 with the same body otherwise. The redirect path keeps working
/// while the click queue is down, but clicks are lost, so it counts as degraded.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Reachable" },
///     "click_queue": { "status": "ok", "message": "Free slots: 10000 of 10000" },
///     "cache": { "status": "ok", "message": "Entries: 42" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (store, cache) = tokio::join!(check_store(&state), check_cache(&state));
    let checks = HealthChecks {
        store,
        click_queue: check_click_queue(&state),
        cache,
    };

    let healthy = checks.store.is_ok() && checks.click_queue.is_ok() && checks.cache.is_ok();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    if state.store.health_check().await {
        CheckStatus::ok("Reachable")
    } else {
        CheckStatus::error("Store unreachable")
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.recorder.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Free slots: {} of {}",
            state.recorder.capacity(),
            state.recorder.max_capacity()
        ))
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus::ok(format!("Entries: {}", state.cache.entry_count()))
    } else {
        CheckStatus::error("Cache unhealthy")
    }
}
