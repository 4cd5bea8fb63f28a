use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Metadata row for one property photo spanning both storage backends.
///
/// Per-property invariants maintained by the repository layer:
/// `display_order` values form exactly `{1..N}` with no duplicates or gaps,
/// and exactly one asset has `is_primary = true` whenever N >= 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaAsset {
    pub id: Uuid,
    pub property_id: Uuid,

    /// Reference into the originals store.
    pub original_file_id: String,
    pub original_folder_id: String,
    pub original_url: String,

    /// Reference into the thumbnail store.
    pub thumbnail_path: String,
    pub thumbnail_url: String,

    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,

    pub display_order: i32,
    pub is_primary: bool,

    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a media asset; id and created_at are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewMediaAsset {
    pub property_id: Uuid,
    pub original_file_id: String,
    pub original_folder_id: String,
    pub original_url: String,
    pub thumbnail_path: String,
    pub thumbnail_url: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub display_order: i32,
    pub is_primary: bool,
    pub uploaded_by: Uuid,
}

/// One failed file in a batch upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFailure {
    pub filename: String,
    pub error: String,
}

/// Structured outcome of a batch upload. A batch never fails as a whole;
/// callers retry only the failed subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchUploadResult {
    pub succeeded: Vec<MediaAsset>,
    pub failed: Vec<UploadFailure>,
}
