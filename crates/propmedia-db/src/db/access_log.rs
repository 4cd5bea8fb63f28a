use async_trait::async_trait;
use propmedia_core::{models::AccessLogEntry, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::AccessLogRepository;

/// Repository for the append-only share access log.
///
/// Rows are only ever inserted here; they disappear solely through the
/// grant's ON DELETE CASCADE.
#[derive(Clone)]
pub struct PgAccessLogRepository {
    pool: PgPool,
}

impl PgAccessLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogRepository for PgAccessLogRepository {
    #[tracing::instrument(skip(self, client_ip, user_agent), fields(db.table = "share_access_log", db.operation = "insert", grant_id = %grant_id))]
    async fn append(
        &self,
        grant_id: Uuid,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AccessLogEntry, AppError> {
        let entry = sqlx::query_as::<Postgres, AccessLogEntry>(
            r#"
            INSERT INTO share_access_log (grant_id, client_ip, user_agent)
            VALUES ($1, $2, $3)
            RETURNING id, grant_id, accessed_at, client_ip, user_agent
            "#,
        )
        .bind(grant_id)
        .bind(client_ip)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    #[tracing::instrument(skip(self), fields(db.table = "share_access_log", db.operation = "select", grant_id = %grant_id))]
    async fn count_for_grant(&self, grant_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM share_access_log WHERE grant_id = $1")
                .bind(grant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
