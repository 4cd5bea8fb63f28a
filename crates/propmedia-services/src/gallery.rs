//! Gallery management: ordering, primary selection and deletion.

use std::sync::Arc;

use propmedia_core::{models::MediaAsset, AppError};
use propmedia_db::AssetRepository;
use propmedia_storage::{OriginalsStore, ThumbnailStore};
use uuid::Uuid;

pub struct GalleryService {
    assets: Arc<dyn AssetRepository>,
    originals: Arc<dyn OriginalsStore>,
    thumbnails: Arc<dyn ThumbnailStore>,
}

impl GalleryService {
    pub fn new(
        assets: Arc<dyn AssetRepository>,
        originals: Arc<dyn OriginalsStore>,
        thumbnails: Arc<dyn ThumbnailStore>,
    ) -> Self {
        Self {
            assets,
            originals,
            thumbnails,
        }
    }

    /// The property's gallery, ordered by display position.
    pub async fn list(&self, property_id: Uuid) -> Result<Vec<MediaAsset>, AppError> {
        self.assets.list_for_property(property_id).await
    }

    /// Apply a complete new ordering. The id list must cover exactly the
    /// property's current assets; on rejection the stored ordering is
    /// untouched and the caller re-fetches the canonical list.
    #[tracing::instrument(skip(self, ordered_ids), fields(property_id = %property_id))]
    pub async fn reorder(
        &self,
        property_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<MediaAsset>, AppError> {
        self.assets.reorder(property_id, ordered_ids).await
    }

    #[tracing::instrument(skip(self), fields(property_id = %property_id, asset_id = %asset_id))]
    pub async fn set_primary(&self, property_id: Uuid, asset_id: Uuid) -> Result<(), AppError> {
        self.assets.set_primary(property_id, asset_id).await
    }

    /// The asset shown as the property's cover. Falls back to the lowest
    /// display order when no row is flagged, so galleries written before
    /// primary tracking still render a cover.
    pub async fn primary_for_property(
        &self,
        property_id: Uuid,
    ) -> Result<Option<MediaAsset>, AppError> {
        let assets = self.assets.list_for_property(property_id).await?;
        Ok(assets
            .iter()
            .find(|a| a.is_primary)
            .cloned()
            .or_else(|| assets.into_iter().next()))
    }

    /// Delete one photo everywhere: original first, then thumbnail, then the
    /// metadata row. Backend deletes are idempotent (missing object is
    /// success), but any other backend failure aborts before metadata is
    /// touched, so a row never points at nothing.
    #[tracing::instrument(skip(self), fields(asset_id = %asset_id))]
    pub async fn delete(&self, asset_id: Uuid) -> Result<(), AppError> {
        let asset = self
            .assets
            .get(asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {asset_id} not found")))?;

        self.originals
            .delete_file(&asset.original_file_id)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        self.thumbnails
            .remove(&asset.thumbnail_path)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        self.assets.delete(asset_id).await?;

        tracing::info!(
            asset_id = %asset_id,
            property_id = %asset.property_id,
            "Photo deleted"
        );

        Ok(())
    }
}
