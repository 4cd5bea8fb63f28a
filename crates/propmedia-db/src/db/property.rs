use async_trait::async_trait;
use propmedia_core::{models::Property, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::PropertyRepository;

/// Read-only access to property records. The CRM owns this table; the media
/// subsystem never writes to it.
#[derive(Clone)]
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<Postgres, Property>(
            r#"
            SELECT id, name, address, description, property_type, area_m2, rooms,
                   price, sale_price, jeonse_deposit, monthly_deposit, monthly_rent,
                   manager_phone, co_broker_phone,
                   owner_name, owner_phone, owner_id_number, contact_relationship,
                   created_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }
}
