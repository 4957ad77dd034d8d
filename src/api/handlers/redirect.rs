//! Handler for slug redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_meta::client_meta_from_headers;

/// Redirects a slug to its destination.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Resolve through [`crate::application::services::RedirectResolver`]
///    (format check, cache, store)
/// 2. Hand a click event to the analytics recorder (non-blocking)
/// 3. Return the configured redirect status with a `Location` header
///
/// # Errors
///
/// - 400 Bad Request - slug has an invalid format
/// - 404 Not Found - no such slug
/// - 410 Gone - link has expired
/// - 503 Service Unavailable - store unreachable or timed out
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let resolution = state.resolver.resolve(&slug).await?;

    let location = HeaderValue::from_str(&resolution.target)
        .map_err(|e| AppError::internal(format!("target is not a valid header value: {e}")))?;

    state.recorder.record(ClickEvent::new(
        resolution.slug,
        state.resolver.clock().now(),
        client_meta_from_headers(&headers),
    ));

    Ok((state.redirect_status, [(header::LOCATION, location)]).into_response())
}
