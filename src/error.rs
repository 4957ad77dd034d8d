//! Application error taxonomy and its HTTP representation.
//!
//! Resolution errors split into permanent ones (`InvalidFormat`, `NotFound`,
//! `Expired`), which are safe to show as "no such link", and the transient
//! [`AppError::Unavailable`], which callers may retry and which must never be
//! cached as a negative result.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::repositories::StoreError;
use crate::domain::validator::ValidationError;
use crate::utils::url_normalizer::TargetUrlError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload shared by every JSON error response.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Slug fails the configured pattern.
    #[error("Slug has an invalid format")]
    InvalidFormat { slug: String },

    /// Slug collides with a reserved system route. Creation-time only.
    #[error("Slug is reserved")]
    Reserved { slug: String },

    /// Destination is not an absolute HTTP(S) URL.
    #[error("Invalid target URL: {reason}")]
    InvalidTarget { reason: String },

    /// Request body failed field validation.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Slug already exists. Creation-time only, never retried automatically.
    #[error("Slug already exists")]
    Conflict { slug: String },

    #[error("Link not found")]
    NotFound { slug: String },

    #[error("Link has expired")]
    Expired { slug: String },

    /// Store or cache infrastructure failure, including store timeouts.
    #[error("Service temporarily unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true when retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidFormat { .. }
            | Self::Reserved { .. }
            | Self::InvalidTarget { .. }
            | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Expired { .. } => StatusCode::GONE,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::InvalidFormat { slug } => ("invalid_format", json!({ "slug": slug })),
            Self::Reserved { slug } => ("reserved", json!({ "slug": slug })),
            Self::InvalidTarget { reason } => ("invalid_target", json!({ "reason": reason })),
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::Conflict { slug } => ("conflict", json!({ "slug": slug })),
            Self::NotFound { slug } => ("not_found", json!({ "slug": slug })),
            Self::Expired { slug } => ("expired", json!({ "slug": slug })),
            // Infrastructure detail stays in the logs.
            Self::Unavailable { .. } => ("unavailable", json!({})),
            Self::Internal { .. } => ("internal_error", json!({})),
        };

        let message = match self {
            Self::Unavailable { .. } => "Service temporarily unavailable".to_string(),
            other => other.to_string(),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidFormat { slug } => Self::InvalidFormat { slug },
            ValidationError::Reserved { slug } => Self::Reserved { slug },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { slug } => Self::Conflict { slug },
            StoreError::NotFound { slug } => Self::NotFound { slug },
            StoreError::Unavailable(reason) => Self::Unavailable { reason },
        }
    }
}

impl From<TargetUrlError> for AppError {
    fn from(err: TargetUrlError) -> Self {
        Self::InvalidTarget {
            reason: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        Self::bad_request("Request validation failed", details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let slug = || "abc".to_string();

        assert_eq!(
            AppError::InvalidFormat { slug: slug() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Reserved { slug: slug() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict { slug: slug() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound { slug: slug() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Expired { slug: slug() }.status_code(),
            StatusCode::GONE
        );
        assert_eq!(
            AppError::unavailable("store timeout").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(AppError::unavailable("down").is_transient());
        assert!(!AppError::NotFound { slug: "x".into() }.is_transient());
        assert!(!AppError::Expired { slug: "x".into() }.is_transient());
        assert!(!AppError::internal("boom").is_transient());
    }

    #[test]
    fn test_unavailable_hides_reason() {
        let info = AppError::unavailable("connection refused to 10.0.0.5").to_error_info();

        assert_eq!(info.code, "unavailable");
        assert!(!info.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_store_error_mapping() {
        let err: AppError = StoreError::Unavailable("timeout".into()).into();
        assert!(matches!(err, AppError::Unavailable { .. }));

        let err: AppError = StoreError::Conflict { slug: "a".into() }.into();
        assert!(matches!(err, AppError::Conflict { slug } if slug == "a"));
    }

    #[test]
    fn test_validation_error_mapping() {
        let err: AppError = ValidationError::Reserved {
            slug: "dashboard".into(),
        }
        .into();
        let info = err.to_error_info();

        assert_eq!(info.code, "reserved");
        assert_eq!(info.details["slug"], "dashboard");
    }
}
