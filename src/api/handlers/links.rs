//! Handlers for link management endpoints (create, read, update, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "slug": "my-link",                    // optional, generated if absent
///   "ttl": 600,                           // optional cache ttl in seconds
///   "expires_at": "2026-12-31T23:59:59Z", // optional
///   "owner_id": "team-a"                  // optional
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request - invalid body, slug format, reserved slug or target
/// - 409 Conflict - slug already exists
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let record = state.resolver.create(payload.try_into()?).await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Returns a stored link, expired or not.
///
/// # Endpoint
///
/// `GET /api/links/{slug}`
pub async fn get_link_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let record = state.resolver.get_link(&slug).await?;

    Ok(Json(record.into()))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /api/links/{slug}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed.
///
/// ```json
/// {
///   "url": "https://new-destination.com",
///   "expires_at": "2026-12-31T23:59:59Z",  // null to clear
///   "ttl": 60                              // null to use the default
/// }
/// ```
///
/// The cached resolution is invalidated, so the next redirect reads the
/// updated record.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
/// Returns 400 Bad Request if validation fails or the body is empty.
pub async fn update_link_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let record = state.resolver.update(&slug, payload.try_into()?).await?;

    Ok(Json(record.into()))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{slug}`
///
/// # Response
///
/// 204 No Content on success.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
pub async fn delete_link_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.resolver.delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}
