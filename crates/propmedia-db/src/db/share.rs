use async_trait::async_trait;
use chrono::{DateTime, Utc};
use propmedia_core::{
    models::{NewShareGrant, ShareGrant, ShareOptionsPatch},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::ShareRepository;

const GRANT_COLUMNS: &str = "id, property_id, token, share_folder_id, include_high_quality, \
     expires_at, view_limit, view_count, hide_contact, hide_price, hide_owner_info, \
     custom_message, created_by, created_at, last_viewed_at";

/// Repository for share grants. Token uniqueness is enforced by the
/// database's unique index, not checked here.
#[derive(Clone)]
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    #[tracing::instrument(skip(self, grant), fields(db.table = "share_grants", db.operation = "insert", property_id = %grant.property_id))]
    async fn insert(&self, grant: NewShareGrant) -> Result<ShareGrant, AppError> {
        let query = format!(
            r#"
            INSERT INTO share_grants (
                property_id, token, share_folder_id, include_high_quality,
                expires_at, view_limit, hide_contact, hide_price,
                hide_owner_info, custom_message, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {GRANT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<Postgres, ShareGrant>(&query)
            .bind(grant.property_id)
            .bind(&grant.token)
            .bind(&grant.share_folder_id)
            .bind(grant.include_high_quality)
            .bind(grant.expires_at)
            .bind(grant.view_limit)
            .bind(grant.hide_contact)
            .bind(grant.hide_price)
            .bind(grant.hide_owner_info)
            .bind(&grant.custom_message)
            .bind(grant.created_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "share_grants", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<ShareGrant>, AppError> {
        let query = format!("SELECT {GRANT_COLUMNS} FROM share_grants WHERE id = $1");

        let row = sqlx::query_as::<Postgres, ShareGrant>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    // The token is a credential; keep it out of the span fields.
    #[tracing::instrument(skip(self, token), fields(db.table = "share_grants", db.operation = "select"))]
    async fn find_by_token(&self, token: &str) -> Result<Option<ShareGrant>, AppError> {
        let query = format!("SELECT {GRANT_COLUMNS} FROM share_grants WHERE token = $1");

        let row = sqlx::query_as::<Postgres, ShareGrant>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "share_grants", db.operation = "select", property_id = %property_id))]
    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<ShareGrant>, AppError> {
        let query = format!(
            "SELECT {GRANT_COLUMNS} FROM share_grants WHERE property_id = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<Postgres, ShareGrant>(&query)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "share_grants", db.operation = "update", db.record_id = %id))]
    async fn record_view(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE share_grants SET view_count = view_count + 1, last_viewed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, patch), fields(db.table = "share_grants", db.operation = "update", db.record_id = %id))]
    async fn update_options(
        &self,
        id: Uuid,
        patch: ShareOptionsPatch,
    ) -> Result<ShareGrant, AppError> {
        // Build update query with only the fields present in the patch
        let mut assignments = Vec::new();
        let mut bind_index = 1;

        if patch.expires_at.is_some() {
            assignments.push(format!("expires_at = ${bind_index}"));
            bind_index += 1;
        }
        if patch.view_limit.is_some() {
            assignments.push(format!("view_limit = ${bind_index}"));
            bind_index += 1;
        }
        if patch.hide_contact.is_some() {
            assignments.push(format!("hide_contact = ${bind_index}"));
            bind_index += 1;
        }
        if patch.hide_price.is_some() {
            assignments.push(format!("hide_price = ${bind_index}"));
            bind_index += 1;
        }
        if patch.hide_owner_info.is_some() {
            assignments.push(format!("hide_owner_info = ${bind_index}"));
            bind_index += 1;
        }
        if patch.custom_message.is_some() {
            assignments.push(format!("custom_message = ${bind_index}"));
            bind_index += 1;
        }

        if assignments.is_empty() {
            return self
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Share grant {id} not found")));
        }

        let query = format!(
            "UPDATE share_grants SET {} WHERE id = ${} RETURNING {}",
            assignments.join(", "),
            bind_index,
            GRANT_COLUMNS
        );

        let mut query_builder = sqlx::query_as::<Postgres, ShareGrant>(&query);
        if let Some(expires_at) = patch.expires_at {
            query_builder = query_builder.bind::<Option<DateTime<Utc>>>(expires_at);
        }
        if let Some(view_limit) = patch.view_limit {
            query_builder = query_builder.bind::<Option<i32>>(view_limit);
        }
        if let Some(hide_contact) = patch.hide_contact {
            query_builder = query_builder.bind(hide_contact);
        }
        if let Some(hide_price) = patch.hide_price {
            query_builder = query_builder.bind(hide_price);
        }
        if let Some(hide_owner_info) = patch.hide_owner_info {
            query_builder = query_builder.bind(hide_owner_info);
        }
        if let Some(custom_message) = patch.custom_message {
            query_builder = query_builder.bind::<Option<String>>(custom_message);
        }
        query_builder = query_builder.bind(id);

        let row = query_builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Share grant {id} not found")))?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "share_grants", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM share_grants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
