use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Read-only projection of a CRM property record.
///
/// Carries exactly the fields the share resolver either passes through or
/// redacts; the CRM owns the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub area_m2: Option<f64>,
    pub rooms: Option<i32>,

    // Price-bearing fields (withheld when hide_price is set)
    pub price: Option<i64>,
    pub sale_price: Option<i64>,
    pub jeonse_deposit: Option<i64>,
    pub monthly_deposit: Option<i64>,
    pub monthly_rent: Option<i64>,

    // Contact fields (withheld when hide_contact is set)
    pub manager_phone: Option<String>,
    pub co_broker_phone: Option<String>,

    // Owner-identity fields (withheld when hide_owner_info is set)
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub owner_id_number: Option<String>,
    pub contact_relationship: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Property as presented through an anonymous share link.
///
/// Withheld field groups are `None` and omitted from the JSON body entirely,
/// so a redacted response never carries even a null-valued sensitive key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedProperty {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub area_m2: Option<f64>,
    pub rooms: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jeonse_deposit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_deposit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_broker_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_relationship: Option<String>,
}
