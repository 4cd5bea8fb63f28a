use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::media_asset::MediaAsset;
use super::property::RedactedProperty;

/// An issued capability permitting anonymous, policy-limited viewing of a
/// property. The token is the sole credential: an unguessable bearer key
/// validated only by storage lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct ShareGrant {
    pub id: Uuid,
    pub property_id: Uuid,
    pub token: String,
    /// Set when high-quality originals were cloned into a dedicated folder.
    pub share_folder_id: Option<String>,
    pub include_high_quality: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_limit: Option<i32>,
    pub view_count: i32,
    pub hide_contact: bool,
    pub hide_price: bool,
    pub hide_owner_info: bool,
    pub custom_message: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

/// Validity of a grant at a point in time.
///
/// `Expired` and `Exhausted` are terminal: once reached, no resolve ever
/// succeeds again. Expiry is checked before the view limit, so an expired
/// grant reports `Expired` regardless of its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStatus {
    Valid,
    Expired,
    Exhausted,
}

impl ShareGrant {
    /// Evaluate the grant's state machine at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> GrantStatus {
        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return GrantStatus::Expired;
            }
        }
        if let Some(limit) = self.view_limit {
            if self.view_count >= limit {
                return GrantStatus::Exhausted;
            }
        }
        GrantStatus::Valid
    }
}

fn default_true() -> bool {
    true
}

/// Options for issuing a share link. Redaction defaults follow the CRM's
/// posture: contact and owner identity hidden, price shown.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareOptions {
    #[serde(default)]
    pub include_high_quality: bool,
    #[serde(default)]
    pub expires_in_days: Option<i64>,
    #[serde(default)]
    pub view_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub hide_contact: bool,
    #[serde(default)]
    pub hide_price: bool,
    #[serde(default = "default_true")]
    pub hide_owner_info: bool,
    #[serde(default)]
    pub custom_message: Option<String>,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            include_high_quality: false,
            expires_in_days: None,
            view_limit: None,
            hide_contact: true,
            hide_price: false,
            hide_owner_info: true,
            custom_message: None,
        }
    }
}

/// Insert payload for a share grant.
#[derive(Debug, Clone)]
pub struct NewShareGrant {
    pub property_id: Uuid,
    pub token: String,
    pub share_folder_id: Option<String>,
    pub include_high_quality: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_limit: Option<i32>,
    pub hide_contact: bool,
    pub hide_price: bool,
    pub hide_owner_info: bool,
    pub custom_message: Option<String>,
    pub created_by: Uuid,
}

/// Partial update of a grant's policy fields.
///
/// Outer `None` leaves a field as-is; an explicit JSON `null` clears a
/// nullable field (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareOptionsPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub view_limit: Option<Option<i32>>,
    pub hide_contact: Option<bool>,
    pub hide_price: Option<bool>,
    pub hide_owner_info: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_message: Option<Option<String>>,
}

/// Distinguishes an absent field (leave as-is) from an explicit `null`
/// (clear the value) when deserializing patch bodies.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Grant plus its access count, for staff-facing listings.
#[derive(Debug, Clone, Serialize)]
pub struct ShareGrantSummary {
    #[serde(flatten)]
    pub grant: ShareGrant,
    pub access_count: i64,
}

/// Aggregate share statistics for one property.
#[derive(Debug, Clone, Serialize)]
pub struct ShareStatistics {
    pub total_shares: usize,
    pub active_shares: usize,
    pub total_views: i64,
}

/// What an anonymous visitor receives when resolving a share token.
#[derive(Debug, Clone, Serialize)]
pub struct SharedProperty {
    pub property: RedactedProperty,
    pub assets: Vec<MediaAsset>,
    pub custom_message: Option<String>,
    pub include_high_quality: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(expires_at: Option<DateTime<Utc>>, view_limit: Option<i32>, view_count: i32) -> ShareGrant {
        ShareGrant {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            token: "t".repeat(64),
            share_folder_id: None,
            include_high_quality: false,
            expires_at,
            view_limit,
            view_count,
            hide_contact: true,
            hide_price: false,
            hide_owner_info: true,
            custom_message: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            last_viewed_at: None,
        }
    }

    #[test]
    fn test_status_valid_without_limits() {
        let g = grant(None, None, 1_000_000);
        assert_eq!(g.status_at(Utc::now()), GrantStatus::Valid);
    }

    #[test]
    fn test_status_expired_is_terminal_even_with_views_left() {
        let now = Utc::now();
        let g = grant(Some(now - Duration::hours(1)), Some(10), 0);
        assert_eq!(g.status_at(now), GrantStatus::Expired);
    }

    #[test]
    fn test_status_exhausted_at_limit() {
        let now = Utc::now();
        let g = grant(None, Some(2), 2);
        assert_eq!(g.status_at(now), GrantStatus::Exhausted);
        let g = grant(None, Some(2), 1);
        assert_eq!(g.status_at(now), GrantStatus::Valid);
    }

    #[test]
    fn test_expiry_checked_before_view_limit() {
        let now = Utc::now();
        let g = grant(Some(now - Duration::minutes(1)), Some(2), 5);
        assert_eq!(g.status_at(now), GrantStatus::Expired);
    }

    #[test]
    fn test_share_options_defaults() {
        let opts: ShareOptions = serde_json::from_str("{}").unwrap();
        assert!(opts.hide_contact);
        assert!(!opts.hide_price);
        assert!(opts.hide_owner_info);
        assert!(!opts.include_high_quality);
        assert!(opts.expires_in_days.is_none());
        assert!(opts.view_limit.is_none());
    }
}
