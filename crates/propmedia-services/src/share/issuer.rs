//! Share issuing, listing, revocation and statistics.

use std::sync::Arc;

use chrono::{Duration, Utc};
use propmedia_core::{
    constants::SHARE_TOKEN_BYTES,
    models::{GrantStatus, NewShareGrant, ShareGrant, ShareGrantSummary, ShareOptions,
        ShareOptionsPatch, ShareStatistics},
    AppError,
};
use propmedia_db::{AccessLogRepository, AssetRepository, PropertyRepository, ShareRepository};
use propmedia_storage::OriginalsStore;
use rand::{rngs::OsRng, TryRngCore};
use serde::Serialize;
use uuid::Uuid;

/// A freshly issued share link.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedShare {
    pub url: String,
    pub grant: ShareGrant,
}

pub struct ShareIssuer {
    shares: Arc<dyn ShareRepository>,
    assets: Arc<dyn AssetRepository>,
    access_log: Arc<dyn AccessLogRepository>,
    properties: Arc<dyn PropertyRepository>,
    originals: Arc<dyn OriginalsStore>,
    public_origin: String,
    share_parent_folder: String,
}

impl ShareIssuer {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        assets: Arc<dyn AssetRepository>,
        access_log: Arc<dyn AccessLogRepository>,
        properties: Arc<dyn PropertyRepository>,
        originals: Arc<dyn OriginalsStore>,
        public_origin: String,
        share_parent_folder: String,
    ) -> Self {
        Self {
            shares,
            assets,
            access_log,
            properties,
            originals,
            public_origin,
            share_parent_folder,
        }
    }

    /// Issue a new share link for a property.
    ///
    /// When `include_high_quality` is set, every current original is cloned
    /// into a dedicated share folder, all-or-nothing: any copy failure tears
    /// the folder down again and the grant is never created.
    #[tracing::instrument(skip(self, options), fields(property_id = %property_id))]
    pub async fn issue(
        &self,
        property_id: Uuid,
        options: ShareOptions,
        created_by: Uuid,
    ) -> Result<IssuedShare, AppError> {
        self.properties
            .get(property_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Property {property_id} not found")))?;

        let token = generate_token()?;

        let share_folder_id = if options.include_high_quality {
            Some(self.clone_originals(property_id, &token).await?)
        } else {
            None
        };

        let expires_at = options
            .expires_in_days
            .map(|days| Utc::now() + Duration::days(days));

        let new_grant = NewShareGrant {
            property_id,
            token: token.clone(),
            share_folder_id: share_folder_id.clone(),
            include_high_quality: options.include_high_quality,
            expires_at,
            view_limit: options.view_limit,
            hide_contact: options.hide_contact,
            hide_price: options.hide_price,
            hide_owner_info: options.hide_owner_info,
            custom_message: options.custom_message,
            created_by,
        };

        let grant = match self.shares.insert(new_grant).await {
            Ok(grant) => grant,
            Err(e) => {
                if let Some(ref folder_id) = share_folder_id {
                    self.remove_share_folder(folder_id).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            grant_id = %grant.id,
            property_id = %property_id,
            include_high_quality = grant.include_high_quality,
            "Share link issued"
        );

        Ok(IssuedShare {
            url: self.share_url(&token),
            grant,
        })
    }

    /// All grants of a property, newest first, with their access counts.
    pub async fn list_for_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<ShareGrantSummary>, AppError> {
        let grants = self.shares.list_for_property(property_id).await?;
        let mut summaries = Vec::with_capacity(grants.len());
        for grant in grants {
            let access_count = self.access_log.count_for_grant(grant.id).await?;
            summaries.push(ShareGrantSummary {
                grant,
                access_count,
            });
        }
        Ok(summaries)
    }

    pub async fn update_options(
        &self,
        id: Uuid,
        patch: ShareOptionsPatch,
    ) -> Result<ShareGrant, AppError> {
        self.shares.update_options(id, patch).await
    }

    /// Revoke a grant. Its share folder (if any) is removed best-effort; the
    /// grant row and its access log rows (cascade) always go.
    #[tracing::instrument(skip(self), fields(grant_id = %id))]
    pub async fn revoke(&self, id: Uuid) -> Result<(), AppError> {
        let grant = self
            .shares
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Share grant {id} not found")))?;

        if let Some(ref folder_id) = grant.share_folder_id {
            self.remove_share_folder(folder_id).await;
        }

        self.shares.delete(id).await?;

        tracing::info!(grant_id = %id, property_id = %grant.property_id, "Share link revoked");
        Ok(())
    }

    pub async fn statistics(&self, property_id: Uuid) -> Result<ShareStatistics, AppError> {
        let grants = self.shares.list_for_property(property_id).await?;
        let now = Utc::now();
        Ok(ShareStatistics {
            total_shares: grants.len(),
            active_shares: grants
                .iter()
                .filter(|g| g.status_at(now) == GrantStatus::Valid)
                .count(),
            total_views: grants.iter().map(|g| g.view_count as i64).sum(),
        })
    }

    fn share_url(&self, token: &str) -> String {
        format!("{}/share/{}", self.public_origin.trim_end_matches('/'), token)
    }

    /// Copy every current original into a fresh `share_{token}` folder.
    /// All-or-nothing: a failed copy removes the folder with everything
    /// already copied, then fails the issue.
    async fn clone_originals(&self, property_id: Uuid, token: &str) -> Result<String, AppError> {
        let parent = self
            .originals
            .find_or_create_folder(None, &self.share_parent_folder)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let folder = self
            .originals
            .find_or_create_folder(Some(&parent.id), &format!("share_{token}"))
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let assets = self.assets.list_for_property(property_id).await?;
        for asset in &assets {
            if let Err(e) = self
                .originals
                .copy_to_folder(&asset.original_file_id, &folder.id)
                .await
            {
                self.remove_share_folder(&folder.id).await;
                return Err(AppError::Storage(format!(
                    "Failed to copy originals into share folder: {e}"
                )));
            }
        }

        tracing::info!(
            property_id = %property_id,
            folder_id = %folder.id,
            copied = assets.len(),
            "High-quality originals cloned for share"
        );

        Ok(folder.id)
    }

    async fn remove_share_folder(&self, folder_id: &str) {
        if let Err(e) = self.originals.delete_folder(folder_id).await {
            tracing::warn!(folder_id = %folder_id, error = %e, "Share folder cleanup failed");
        }
    }
}

/// Mint a new capability token: high-entropy random bytes from the OS,
/// hex-encoded. Uniqueness is backstopped by the token column's unique index.
fn generate_token() -> Result<String, AppError> {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("OS RNG unavailable: {e}")))?;
    Ok(hex::encode(bytes))
}
