//! Repository traits consumed by the service layer.
//!
//! Signatures are sqlx-free on purpose: services hold `Arc<dyn ...>` and
//! their tests substitute in-memory fakes.

use async_trait::async_trait;
use propmedia_core::{
    models::{
        AccessLogEntry, MediaAsset, NewMediaAsset, NewShareGrant, Property, ShareGrant,
        ShareOptionsPatch,
    },
    AppError,
};
use uuid::Uuid;

/// Metadata rows for property photos.
///
/// Implementations maintain the per-property invariants: contiguous
/// `display_order` starting at 1, and exactly one primary asset whenever the
/// property has any.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn insert(&self, asset: NewMediaAsset) -> Result<MediaAsset, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError>;

    /// All assets of a property, ordered by `display_order` ascending.
    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MediaAsset>, AppError>;

    /// The next free display order for a property (max + 1, or 1 when empty).
    async fn next_display_order(&self, property_id: Uuid) -> Result<i32, AppError>;

    /// Renumber the property's assets to match `ordered_ids` (first id gets
    /// order 1). Rejects with `AppError::InvalidInput` unless `ordered_ids`
    /// is exactly the set of the property's current asset ids.
    async fn reorder(
        &self,
        property_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<MediaAsset>, AppError>;

    /// Flag `asset_id` as the property's single primary asset.
    async fn set_primary(&self, property_id: Uuid, asset_id: Uuid) -> Result<(), AppError>;

    /// Delete the row, close the resulting order gap, and promote the lowest
    /// remaining order to primary if the deleted asset was primary. Deleting
    /// a missing id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Share grant rows. The token column carries a unique index; insert
/// surfaces a collision as a database error.
#[async_trait]
pub trait ShareRepository: Send + Sync {
    async fn insert(&self, grant: NewShareGrant) -> Result<ShareGrant, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<ShareGrant>, AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareGrant>, AppError>;

    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<ShareGrant>, AppError>;

    /// Atomically bump `view_count` and stamp `last_viewed_at`.
    async fn record_view(&self, id: Uuid) -> Result<(), AppError>;

    async fn update_options(
        &self,
        id: Uuid,
        patch: ShareOptionsPatch,
    ) -> Result<ShareGrant, AppError>;

    /// Delete the grant; access log rows go with it (FK cascade).
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Append-only access audit for share resolves.
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    async fn append(
        &self,
        grant_id: Uuid,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AccessLogEntry, AppError>;

    async fn count_for_grant(&self, grant_id: Uuid) -> Result<i64, AppError>;
}

/// Read-only access to the CRM's property records.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError>;
}
