//! Property photo upload and gallery management.

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use propmedia_core::{
    models::{BatchUploadResult, MediaAsset},
    AppError,
};
use propmedia_services::UploadFile;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::MediaState;

/// Upload a batch of photos for a property.
///
/// Files fail or succeed independently; 201 when every file landed, 207 when
/// the batch is mixed. Only an empty batch or unknown property rejects whole.
pub async fn upload_images(
    State(state): State<MediaState>,
    Path(property_id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BatchUploadResult>), HttpAppError> {
    let property = state
        .properties
        .get(property_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Property {property_id} not found")))?;

    let uploaded_by = super::staff_id(&headers);

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        // Non-file fields (metadata the gateway tacks on) are ignored.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {e}")))?
            .to_vec();

        files.push(UploadFile {
            filename,
            content_type,
            data,
        });
    }

    let result = state
        .upload
        .upload_batch(
            property_id,
            &property.name,
            files,
            uploaded_by,
            CancellationToken::new(),
        )
        .await?;

    let status = if result.failed.is_empty() {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(result)))
}

pub async fn list_images(
    State(state): State<MediaState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<MediaAsset>>, HttpAppError> {
    Ok(Json(state.gallery.list(property_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(length(min = 1, message = "image_ids must not be empty"))]
    pub image_ids: Vec<Uuid>,
}

/// Replace the gallery ordering. The id list must cover exactly the current
/// gallery; a stale list (concurrent upload or delete) is rejected and the
/// client re-fetches.
pub async fn reorder_images(
    State(state): State<MediaState>,
    Path(property_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<ReorderRequest>,
) -> Result<Json<Vec<MediaAsset>>, HttpAppError> {
    let assets = state.gallery.reorder(property_id, &body.image_ids).await?;
    Ok(Json(assets))
}

pub async fn set_primary_image(
    State(state): State<MediaState>,
    Path((property_id, asset_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, HttpAppError> {
    state.gallery.set_primary(property_id, asset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_image(
    State(state): State<MediaState>,
    Path(asset_id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.gallery.delete(asset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
