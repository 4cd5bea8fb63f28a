use async_trait::async_trait;
use propmedia_core::{
    models::{MediaAsset, NewMediaAsset},
    AppError,
};
use sqlx::{PgPool, Postgres};
use std::collections::HashSet;
use uuid::Uuid;

use super::traits::AssetRepository;
use super::transaction::with_transaction;

const ASSET_COLUMNS: &str = "id, property_id, original_file_id, original_folder_id, original_url, \
     thumbnail_path, thumbnail_url, original_filename, file_size, content_type, \
     display_order, is_primary, uploaded_by, created_at";

/// Repository for media asset metadata rows.
///
/// The `(property_id, display_order)` unique constraint is deferrable, so
/// renumbering inside a transaction never trips over its own intermediate
/// states.
#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    #[tracing::instrument(skip(self, asset), fields(db.table = "media_assets", db.operation = "insert", property_id = %asset.property_id))]
    async fn insert(&self, asset: NewMediaAsset) -> Result<MediaAsset, AppError> {
        let query = format!(
            r#"
            INSERT INTO media_assets (
                property_id, original_file_id, original_folder_id, original_url,
                thumbnail_path, thumbnail_url, original_filename, file_size,
                content_type, display_order, is_primary, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ASSET_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(asset.property_id)
            .bind(&asset.original_file_id)
            .bind(&asset.original_folder_id)
            .bind(&asset.original_url)
            .bind(&asset.thumbnail_path)
            .bind(&asset.thumbnail_url)
            .bind(&asset.original_filename)
            .bind(asset.file_size)
            .bind(&asset.content_type)
            .bind(asset.display_order)
            .bind(asset.is_primary)
            .bind(asset.uploaded_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM media_assets WHERE id = $1");

        let row = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", property_id = %property_id))]
    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MediaAsset>, AppError> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM media_assets WHERE property_id = $1 ORDER BY display_order ASC"
        );

        let rows = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", property_id = %property_id))]
    async fn next_display_order(&self, property_id: Uuid) -> Result<i32, AppError> {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order), 0) + 1 FROM media_assets WHERE property_id = $1",
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(next)
    }

    #[tracing::instrument(skip(self, ordered_ids), fields(db.table = "media_assets", db.operation = "update", property_id = %property_id))]
    async fn reorder(
        &self,
        property_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<MediaAsset>, AppError> {
        let unique: HashSet<Uuid> = ordered_ids.iter().copied().collect();
        if unique.len() != ordered_ids.len() {
            return Err(AppError::InvalidInput(
                "Duplicate asset ids in reorder request".to_string(),
            ));
        }

        let ordered = ordered_ids.to_vec();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let current_ids: Vec<Uuid> = sqlx::query_scalar(
                    "SELECT id FROM media_assets WHERE property_id = $1 FOR UPDATE",
                )
                .bind(property_id)
                .fetch_all(&mut **tx)
                .await?;

                let current: HashSet<Uuid> = current_ids.iter().copied().collect();
                let requested: HashSet<Uuid> = ordered.iter().copied().collect();
                if current != requested {
                    return Err(AppError::InvalidInput(
                        "Reorder request must list exactly the property's current assets"
                            .to_string(),
                    ));
                }

                for (index, asset_id) in ordered.iter().enumerate() {
                    sqlx::query("UPDATE media_assets SET display_order = $1 WHERE id = $2")
                        .bind(index as i32 + 1)
                        .bind(asset_id)
                        .execute(&mut **tx)
                        .await?;
                }

                let query = format!(
                    "SELECT {ASSET_COLUMNS} FROM media_assets WHERE property_id = $1 ORDER BY display_order ASC"
                );
                let rows = sqlx::query_as::<Postgres, MediaAsset>(&query)
                    .bind(property_id)
                    .fetch_all(&mut **tx)
                    .await?;

                Ok(rows)
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "update", property_id = %property_id, db.record_id = %asset_id))]
    async fn set_primary(&self, property_id: Uuid, asset_id: Uuid) -> Result<(), AppError> {
        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                let belongs: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM media_assets WHERE id = $1 AND property_id = $2)",
                )
                .bind(asset_id)
                .bind(property_id)
                .fetch_one(&mut **tx)
                .await?;

                if !belongs {
                    return Err(AppError::NotFound(format!(
                        "Asset {asset_id} not found for property {property_id}"
                    )));
                }

                sqlx::query(
                    "UPDATE media_assets SET is_primary = FALSE WHERE property_id = $1 AND is_primary",
                )
                .bind(property_id)
                .execute(&mut **tx)
                .await?;

                sqlx::query("UPDATE media_assets SET is_primary = TRUE WHERE id = $1")
                    .bind(asset_id)
                    .execute(&mut **tx)
                    .await?;

                Ok(())
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                let removed: Option<(Uuid, i32, bool)> = sqlx::query_as(
                    "DELETE FROM media_assets WHERE id = $1 RETURNING property_id, display_order, is_primary",
                )
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

                // Already gone: nothing to compact.
                let Some((property_id, display_order, was_primary)) = removed else {
                    return Ok(());
                };

                sqlx::query(
                    "UPDATE media_assets SET display_order = display_order - 1 WHERE property_id = $1 AND display_order > $2",
                )
                .bind(property_id)
                .bind(display_order)
                .execute(&mut **tx)
                .await?;

                if was_primary {
                    sqlx::query(
                        r#"
                        UPDATE media_assets SET is_primary = TRUE
                        WHERE id = (
                            SELECT id FROM media_assets
                            WHERE property_id = $1
                            ORDER BY display_order ASC
                            LIMIT 1
                        )
                        "#,
                    )
                    .bind(property_id)
                    .execute(&mut **tx)
                    .await?;
                }

                Ok(())
            })
        })
        .await
    }
}
