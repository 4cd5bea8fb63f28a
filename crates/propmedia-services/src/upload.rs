//! Dual-write upload pipeline for property photos.
//!
//! Every accepted file lands in both backends (full-resolution original plus
//! downscaled thumbnail) and gets one metadata row. Files are processed
//! independently: a failed file is reported in the batch result and never
//! aborts its siblings. Backend writes that cannot be completed end-to-end
//! are compensated in reverse order, so a failed file leaves nothing behind.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use propmedia_core::{
    models::{BatchUploadResult, NewMediaAsset, UploadFailure},
    AppError,
};
use propmedia_db::AssetRepository;
use propmedia_processing::{ImageValidator, ThumbnailGenerator};
use propmedia_storage::{keys::sanitize_name, Folder, OriginalsStore, ThumbnailStore};
use tokio::sync::{Mutex, OnceCell};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How many files of one batch are processed at a time.
const MAX_CONCURRENT_FILES: usize = 4;

/// One file of a batch upload, as extracted from the multipart request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct UploadPipeline {
    assets: Arc<dyn AssetRepository>,
    originals: Arc<dyn OriginalsStore>,
    thumbnails: Arc<dyn ThumbnailStore>,
    validator: ImageValidator,
    generator: ThumbnailGenerator,
}

impl UploadPipeline {
    pub fn new(
        assets: Arc<dyn AssetRepository>,
        originals: Arc<dyn OriginalsStore>,
        thumbnails: Arc<dyn ThumbnailStore>,
    ) -> Self {
        Self {
            assets,
            originals,
            thumbnails,
            validator: ImageValidator::default(),
            generator: ThumbnailGenerator::default(),
        }
    }

    /// Upload a batch of photos for one property.
    ///
    /// Returns a structured split of successes and failures; the batch itself
    /// only errors on empty input. A cancelled token stops files that have
    /// not started yet; in-flight files run to completion or failure.
    #[tracing::instrument(skip(self, files, cancel), fields(property_id = %property_id, file_count = files.len()))]
    pub async fn upload_batch(
        &self,
        property_id: Uuid,
        property_name: &str,
        files: Vec<UploadFile>,
        uploaded_by: Uuid,
        cancel: CancellationToken,
    ) -> Result<BatchUploadResult, AppError> {
        if property_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Property name must not be empty".to_string(),
            ));
        }
        if files.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one file is required".to_string(),
            ));
        }

        // The property folder is found-or-created once per batch, lazily, so
        // a batch of invalid files creates nothing.
        let folder_cell: OnceCell<Folder> = OnceCell::new();

        // display_order claims are serialized across concurrently-processing
        // files; the counter only advances after a file's metadata row is in.
        let next_order = self.assets.next_display_order(property_id).await?;
        let order_counter = Mutex::new(next_order);

        let results: Vec<Result<_, UploadFailure>> = stream::iter(files)
            .map(|file| {
                self.process_file(
                    property_id,
                    property_name,
                    file,
                    uploaded_by,
                    &folder_cell,
                    &order_counter,
                    &cancel,
                )
            })
            .buffer_unordered(MAX_CONCURRENT_FILES)
            .collect()
            .await;

        let mut outcome = BatchUploadResult::default();
        for result in results {
            match result {
                Ok(asset) => outcome.succeeded.push(asset),
                Err(failure) => outcome.failed.push(failure),
            }
        }
        outcome
            .succeeded
            .sort_by_key(|asset| asset.display_order);

        tracing::info!(
            property_id = %property_id,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Batch upload finished"
        );

        Ok(outcome)
    }

    /// Process one file end to end: validate, thumbnail, write original,
    /// write thumbnail, insert metadata. Any failure is compensated in
    /// reverse step order and reported as an [`UploadFailure`].
    #[allow(clippy::too_many_arguments)]
    async fn process_file(
        &self,
        property_id: Uuid,
        property_name: &str,
        file: UploadFile,
        uploaded_by: Uuid,
        folder_cell: &OnceCell<Folder>,
        order_counter: &Mutex<i32>,
        cancel: &CancellationToken,
    ) -> Result<propmedia_core::models::MediaAsset, UploadFailure> {
        let fail = |error: String| UploadFailure {
            filename: file.filename.clone(),
            error,
        };

        if cancel.is_cancelled() {
            return Err(fail("Upload cancelled".to_string()));
        }

        // 1. Validate before any I/O.
        self.validator
            .validate(&file.filename, &file.content_type, file.data.len())
            .map_err(|e| fail(e.to_string()))?;

        // 2. Generate the thumbnail in memory; an undecodable file must not
        // reach either backend.
        let thumbnail = self
            .generator
            .generate(&file.data)
            .map_err(|e| fail(e.to_string()))?;

        // 3. Upload the original into the property folder.
        let folder = folder_cell
            .get_or_try_init(|| async {
                let name = format!("{}_{}", sanitize_name(property_name), property_id);
                self.originals.find_or_create_folder(None, &name).await
            })
            .await
            .map_err(|e| fail(format!("Failed to prepare property folder: {e}")))?;

        let filename = sanitize_name(&file.filename);
        let stored = self
            .originals
            .upload(&folder.id, &filename, &file.content_type, file.data.clone())
            .await
            .map_err(|e| fail(e.to_string()))?;

        // 4+5. Claim the next display order and finish the remaining writes
        // while holding the claim. The counter only advances once the
        // metadata row exists, so failed files never burn an order and the
        // per-property sequence stays contiguous.
        let mut order = order_counter.lock().await;
        let display_order = *order;

        let thumbnail_path = format!("{property_id}/thumb_{display_order}_{filename}");
        let stored_thumb_path = match self
            .thumbnails
            .upload(&thumbnail_path, "image/jpeg", thumbnail.data)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                self.cleanup_original(&stored.id).await;
                return Err(fail(e.to_string()));
            }
        };

        let new_asset = NewMediaAsset {
            property_id,
            original_file_id: stored.id.clone(),
            original_folder_id: folder.id.clone(),
            original_url: stored.url.clone(),
            thumbnail_url: self.thumbnails.public_url(&stored_thumb_path),
            thumbnail_path: stored_thumb_path.clone(),
            original_filename: file.filename.clone(),
            file_size: stored.size as i64,
            content_type: file.content_type.clone(),
            display_order,
            // The very first asset a property ever receives becomes primary.
            is_primary: display_order == 1,
            uploaded_by,
        };

        let asset = match self.assets.insert(new_asset).await {
            Ok(asset) => asset,
            Err(e) => {
                self.cleanup_thumbnail(&stored_thumb_path).await;
                self.cleanup_original(&stored.id).await;
                return Err(fail(format!("Failed to store metadata: {e}")));
            }
        };

        *order += 1;
        drop(order);

        tracing::info!(
            asset_id = %asset.id,
            property_id = %property_id,
            display_order = asset.display_order,
            is_primary = asset.is_primary,
            "Photo uploaded"
        );

        Ok(asset)
    }

    async fn cleanup_original(&self, file_id: &str) {
        if let Err(e) = self.originals.delete_file(file_id).await {
            tracing::warn!(file_id = %file_id, error = %e, "Cleanup of original failed");
        }
    }

    async fn cleanup_thumbnail(&self, path: &str) {
        if let Err(e) = self.thumbnails.remove(path).await {
            tracing::warn!(path = %path, error = %e, "Cleanup of thumbnail failed");
        }
    }
}
