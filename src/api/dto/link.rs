//! DTOs for the link endpoints.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::serde_as;
use validator::Validate;

use crate::domain::entities::{LinkPatch, LinkRecord, MAX_TTL_SECONDS, NewLink};
use crate::error::AppError;

/// Converts a ttl in seconds, rejecting values outside `1..=MAX_TTL_SECONDS`.
fn ttl_from_seconds(seconds: i64) -> Result<Duration, AppError> {
    if !(1..=MAX_TTL_SECONDS).contains(&seconds) {
        return Err(AppError::bad_request(
            format!("ttl must be between 1 and {MAX_TTL_SECONDS} seconds"),
            json!({ "ttl": seconds }),
        ));
    }
    Ok(Duration::seconds(seconds))
}

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Custom slug. Generated when absent.
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    /// Destination URL (absolute HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Cache lifetime of this link's resolution, in seconds.
    #[validate(range(min = 1, max = 315_360_000, message = "ttl must be between 1 and 315360000 seconds"))]
    pub ttl: Option<i64>,

    /// After this time, the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 128))]
    pub owner_id: Option<String>,
}

impl TryFrom<CreateLinkRequest> for NewLink {
    type Error = AppError;

    fn try_from(req: CreateLinkRequest) -> Result<Self, Self::Error> {
        Ok(NewLink {
            slug: req.slug,
            target: req.url,
            ttl: req.ttl.map(ttl_from_seconds).transpose()?,
            expires_at: req.expires_at,
            owner_id: req.owner_id,
        })
    }
}

/// Request body for `PATCH /api/links/{slug}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # `expires_at` and `ttl` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear (never expires / default cache ttl)
/// - **Value** → set
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    /// New destination URL for this link.
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub ttl: Option<Option<i64>>,
}

impl TryFrom<UpdateLinkRequest> for LinkPatch {
    type Error = AppError;

    fn try_from(req: UpdateLinkRequest) -> Result<Self, Self::Error> {
        let ttl = match req.ttl {
            Some(Some(seconds)) => Some(Some(ttl_from_seconds(seconds)?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(LinkPatch {
            target: req.url,
            expires_at: req.expires_at,
            ttl,
        })
    }
}

/// JSON representation of a stored link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub slug: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Per-link cache ttl in seconds; `null` means the configured default.
    pub ttl: Option<i64>,
}

impl From<LinkRecord> for LinkResponse {
    fn from(record: LinkRecord) -> Self {
        Self {
            slug: record.slug,
            url: record.target.to_string(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            owner_id: record.owner_id,
            ttl: record.cache_ttl.map(|ttl| ttl.num_seconds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_absent_and_null() {
        let absent: UpdateLinkRequest = serde_json::from_value(json!({})).unwrap();
        assert!(absent.expires_at.is_none());
        assert!(absent.ttl.is_none());

        let null: UpdateLinkRequest =
            serde_json::from_value(json!({ "expires_at": null, "ttl": null })).unwrap();
        assert_eq!(null.expires_at, Some(None));
        assert_eq!(null.ttl, Some(None));

        let patch = LinkPatch::try_from(
            serde_json::from_value::<UpdateLinkRequest>(json!({ "ttl": 60 })).unwrap(),
        )
        .unwrap();
        assert_eq!(patch.ttl, Some(Some(Duration::seconds(60))));
    }

    #[test]
    fn test_oversized_ttl_is_rejected_not_panicking() {
        let create: CreateLinkRequest = serde_json::from_value(
            json!({ "url": "https://example.com", "ttl": 100_000_000_000_000_000i64 }),
        )
        .unwrap();
        assert!(create.validate().is_err());
        assert!(matches!(
            NewLink::try_from(create),
            Err(AppError::Validation { .. })
        ));

        let update: UpdateLinkRequest =
            serde_json::from_value(json!({ "ttl": i64::MAX })).unwrap();
        assert!(matches!(
            LinkPatch::try_from(update),
            Err(AppError::Validation { .. })
        ));

        let negative: UpdateLinkRequest = serde_json::from_value(json!({ "ttl": -5 })).unwrap();
        assert!(LinkPatch::try_from(negative).is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let ok: CreateLinkRequest =
            serde_json::from_value(json!({ "url": "https://example.com", "ttl": 60 })).unwrap();
        assert!(ok.validate().is_ok());

        let bad_url: CreateLinkRequest =
            serde_json::from_value(json!({ "url": "not a url" })).unwrap();
        assert!(bad_url.validate().is_err());

        let bad_ttl: CreateLinkRequest =
            serde_json::from_value(json!({ "url": "https://example.com", "ttl": 0 })).unwrap();
        assert!(bad_ttl.validate().is_err());
    }
}
