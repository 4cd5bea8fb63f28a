//! Staff-facing share grant management.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use propmedia_core::{
    models::{ShareGrant, ShareGrantSummary, ShareOptions, ShareOptionsPatch, ShareStatistics},
    AppError,
};
use propmedia_services::IssuedShare;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::ShareState;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct IssueShareRequest {
    #[serde(default)]
    pub include_high_quality: bool,
    #[validate(range(min = 1, max = 365))]
    pub expires_in_days: Option<i64>,
    #[validate(range(min = 1))]
    pub view_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub hide_contact: bool,
    #[serde(default)]
    pub hide_price: bool,
    #[serde(default = "default_true")]
    pub hide_owner_info: bool,
    #[validate(length(max = 500))]
    pub custom_message: Option<String>,
}

impl From<IssueShareRequest> for ShareOptions {
    fn from(req: IssueShareRequest) -> Self {
        ShareOptions {
            include_high_quality: req.include_high_quality,
            expires_in_days: req.expires_in_days,
            view_limit: req.view_limit,
            hide_contact: req.hide_contact,
            hide_price: req.hide_price,
            hide_owner_info: req.hide_owner_info,
            custom_message: req.custom_message,
        }
    }
}

pub async fn issue_share(
    State(state): State<ShareState>,
    Path(property_id): Path<Uuid>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<IssueShareRequest>,
) -> Result<(StatusCode, Json<IssuedShare>), HttpAppError> {
    let created_by = super::staff_id(&headers);
    let issued = state
        .issuer
        .issue(property_id, body.into(), created_by)
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn list_shares(
    State(state): State<ShareState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<ShareGrantSummary>>, HttpAppError> {
    Ok(Json(state.issuer.list_for_property(property_id).await?))
}

/// Patch a grant's policy fields. Absent fields stay, explicit `null` clears.
/// Provided values obey the same limits as at issue time.
pub async fn update_share(
    State(state): State<ShareState>,
    Path(grant_id): Path<Uuid>,
    Json(patch): Json<ShareOptionsPatch>,
) -> Result<Json<ShareGrant>, HttpAppError> {
    validate_patch(&patch)?;
    Ok(Json(state.issuer.update_options(grant_id, patch).await?))
}

/// The patch's double-`Option` fields fall outside what `validator` derives
/// handle, so the issue-time limits are checked by hand.
fn validate_patch(patch: &ShareOptionsPatch) -> Result<(), AppError> {
    if let Some(Some(limit)) = patch.view_limit {
        if limit < 1 {
            return Err(AppError::InvalidInput(
                "view_limit must be at least 1".to_string(),
            ));
        }
    }
    if let Some(Some(ref message)) = patch.custom_message {
        if message.chars().count() > 500 {
            return Err(AppError::InvalidInput(
                "custom_message must be at most 500 characters".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn share_statistics(
    State(state): State<ShareState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<ShareStatistics>, HttpAppError> {
    Ok(Json(state.issuer.statistics(property_id).await?))
}

pub async fn revoke_share(
    State(state): State<ShareState>,
    Path(grant_id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.issuer.revoke(grant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_request_defaults_match_redaction_posture() {
        let req: IssueShareRequest = serde_json::from_str("{}").unwrap();
        assert!(req.hide_contact);
        assert!(!req.hide_price);
        assert!(req.hide_owner_info);
        assert!(!req.include_high_quality);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_issue_request_rejects_zero_view_limit() {
        let req: IssueShareRequest = serde_json::from_str(r#"{"view_limit": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_issue_request_rejects_negative_expiry() {
        let req: IssueShareRequest = serde_json::from_str(r#"{"expires_in_days": -1}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_patch_rejects_zero_view_limit() {
        let patch: ShareOptionsPatch = serde_json::from_str(r#"{"view_limit": 0}"#).unwrap();
        assert!(matches!(
            validate_patch(&patch),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_patch_rejects_oversized_custom_message() {
        let long = "x".repeat(501);
        let patch = ShareOptionsPatch {
            custom_message: Some(Some(long)),
            ..ShareOptionsPatch::default()
        };
        assert!(matches!(
            validate_patch(&patch),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_patch_accepts_clears_and_valid_values() {
        // Explicit nulls (clears) and in-range values both pass.
        let patch: ShareOptionsPatch =
            serde_json::from_str(r#"{"view_limit": null, "custom_message": null}"#).unwrap();
        assert!(validate_patch(&patch).is_ok());

        let patch: ShareOptionsPatch =
            serde_json::from_str(r#"{"view_limit": 3, "custom_message": "Open house Sunday"}"#)
                .unwrap();
        assert!(validate_patch(&patch).is_ok());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: ShareOptionsPatch = serde_json::from_str(r#"{"view_limit": null}"#).unwrap();
        assert_eq!(patch.view_limit, Some(None));
        assert!(patch.expires_at.is_none());

        let patch: ShareOptionsPatch = serde_json::from_str(r#"{"view_limit": 5}"#).unwrap();
        assert_eq!(patch.view_limit, Some(Some(5)));
    }
}
