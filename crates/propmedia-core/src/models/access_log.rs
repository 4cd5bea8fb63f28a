use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Append-only audit record of one share-resolve attempt.
///
/// Never mutated; removed only by cascade when its grant is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct AccessLogEntry {
    pub id: Uuid,
    pub grant_id: Uuid,
    pub accessed_at: DateTime<Utc>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}
