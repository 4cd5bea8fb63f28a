//! Anonymous share resolution.
//!
//! The token is the sole credential. Resolution walks the grant's state
//! machine, counts the view best-effort, redacts the property and appends an
//! access log entry in the background.

use std::sync::Arc;

use chrono::Utc;
use propmedia_core::{
    models::{GrantStatus, SharedProperty},
    AppError,
};
use propmedia_db::{AccessLogRepository, AssetRepository, PropertyRepository, ShareRepository};
use uuid::Uuid;

use super::redaction::redact_property;

/// What the HTTP layer knows about the anonymous visitor.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

pub struct ShareResolver {
    shares: Arc<dyn ShareRepository>,
    assets: Arc<dyn AssetRepository>,
    properties: Arc<dyn PropertyRepository>,
    access_log: Arc<dyn AccessLogRepository>,
}

impl ShareResolver {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        assets: Arc<dyn AssetRepository>,
        properties: Arc<dyn PropertyRepository>,
        access_log: Arc<dyn AccessLogRepository>,
    ) -> Self {
        Self {
            shares,
            assets,
            properties,
            access_log,
        }
    }

    /// Resolve a share token to its redacted property view.
    ///
    /// Expiry is checked before the view limit, so an expired grant always
    /// reports expired. View counting is best-effort: a failed increment is
    /// logged and the visitor still gets the page. The increment-and-check is
    /// not atomic across concurrent resolvers, so a view limit can be
    /// overshot by a few views under load.
    #[tracing::instrument(skip(self, token, client))]
    pub async fn resolve(
        &self,
        token: &str,
        client: ClientInfo,
    ) -> Result<SharedProperty, AppError> {
        let grant = self
            .shares
            .find_by_token(token)
            .await?
            .ok_or(AppError::ShareNotFound)?;

        match grant.status_at(Utc::now()) {
            GrantStatus::Expired => return Err(AppError::ShareExpired),
            GrantStatus::Exhausted => return Err(AppError::ShareExhausted),
            GrantStatus::Valid => {}
        }

        // Fetch the property before counting the view, so a resolve that
        // cannot be served never burns a view.
        let property = self
            .properties
            .get(grant.property_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Property {} not found", grant.property_id))
            })?;

        if let Err(e) = self.shares.record_view(grant.id).await {
            tracing::warn!(grant_id = %grant.id, error = %e, "View count update failed");
        }

        let assets = self.assets.list_for_property(grant.property_id).await?;

        self.log_access(grant.id, client);

        Ok(SharedProperty {
            property: redact_property(property, &grant),
            assets,
            custom_message: grant.custom_message.clone(),
            include_high_quality: grant.include_high_quality,
        })
    }

    /// Append to the access log in the background; failures only warn.
    fn log_access(&self, grant_id: Uuid, client: ClientInfo) {
        let access_log = self.access_log.clone();
        tokio::spawn(async move {
            if let Err(e) = access_log
                .append(grant_id, client.ip, client.user_agent)
                .await
            {
                tracing::warn!(grant_id = %grant_id, error = %e, "Access log append failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        sample_property, InMemoryAccessLogRepository, InMemoryAssetRepository,
        InMemoryPropertyRepository, InMemoryShareRepository,
    };
    use chrono::Duration;
    use propmedia_core::models::NewShareGrant;
    use std::time::Duration as StdDuration;

    struct Harness {
        resolver: ShareResolver,
        shares: Arc<InMemoryShareRepository>,
        access_log: Arc<InMemoryAccessLogRepository>,
        property_id: Uuid,
    }

    fn harness() -> Harness {
        let shares = Arc::new(InMemoryShareRepository::new());
        let assets = Arc::new(InMemoryAssetRepository::new());
        let properties = Arc::new(InMemoryPropertyRepository::new());
        let access_log = Arc::new(InMemoryAccessLogRepository::new());

        let property_id = Uuid::new_v4();
        properties.insert(sample_property(property_id));

        let resolver = ShareResolver::new(
            shares.clone(),
            assets,
            properties,
            access_log.clone(),
        );

        Harness {
            resolver,
            shares,
            access_log,
            property_id,
        }
    }

    async fn seed_grant(h: &Harness, mutate: impl FnOnce(&mut NewShareGrant)) -> String {
        let mut grant = NewShareGrant {
            property_id: h.property_id,
            token: hex::encode(Uuid::new_v4().as_bytes()) + &hex::encode(Uuid::new_v4().as_bytes()),
            share_folder_id: None,
            include_high_quality: false,
            expires_at: None,
            view_limit: None,
            hide_contact: true,
            hide_price: false,
            hide_owner_info: true,
            custom_message: None,
            created_by: Uuid::new_v4(),
        };
        mutate(&mut grant);
        let token = grant.token.clone();
        h.shares.insert(grant).await.unwrap();
        token
    }

    #[tokio::test]
    async fn test_unknown_token_is_share_not_found() {
        let h = harness();
        let err = h
            .resolver
            .resolve("deadbeef", ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ShareNotFound));
    }

    #[tokio::test]
    async fn test_expired_grant_is_terminal() {
        let h = harness();
        let token = seed_grant(&h, |g| {
            g.expires_at = Some(Utc::now() - Duration::hours(1));
            g.view_limit = Some(100);
        })
        .await;

        let err = h
            .resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ShareExpired));

        // No view is counted for a rejected resolve.
        let grant = h.shares.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(grant.view_count, 0);
    }

    #[tokio::test]
    async fn test_view_limit_exhausts_the_grant() {
        let h = harness();
        let token = seed_grant(&h, |g| g.view_limit = Some(1)).await;

        h.resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap();

        let err = h
            .resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ShareExhausted));
    }

    #[tokio::test]
    async fn test_resolve_counts_view_and_stamps_timestamp() {
        let h = harness();
        let token = seed_grant(&h, |_| {}).await;

        h.resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap();

        let grant = h.shares.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(grant.view_count, 1);
        assert!(grant.last_viewed_at.is_some());
    }

    #[tokio::test]
    async fn test_resolve_applies_redaction_flags() {
        let h = harness();
        let token = seed_grant(&h, |g| g.hide_price = true).await;

        let shared = h
            .resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap();

        assert!(shared.property.manager_phone.is_none());
        assert!(shared.property.owner_name.is_none());
        assert!(shared.property.price.is_none());
        assert_eq!(shared.property.name, "Sunny Villa 3F");
    }

    #[tokio::test]
    async fn test_resolve_passes_custom_message_through() {
        let h = harness();
        let token = seed_grant(&h, |g| {
            g.custom_message = Some("Viewing this weekend only".to_string());
        })
        .await;

        let shared = h
            .resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(
            shared.custom_message.as_deref(),
            Some("Viewing this weekend only")
        );
    }

    #[tokio::test]
    async fn test_vanished_property_does_not_burn_a_view() {
        let h = harness();
        // Grant pointing at a property this subsystem cannot serve.
        let token = seed_grant(&h, |g| {
            g.property_id = Uuid::new_v4();
            g.view_limit = Some(1);
        })
        .await;

        let err = h
            .resolver
            .resolve(&token, ClientInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let grant = h.shares.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(grant.view_count, 0);
        assert!(grant.last_viewed_at.is_none());
    }

    #[tokio::test]
    async fn test_failed_view_count_does_not_fail_the_resolve() {
        let h = harness();
        let token = seed_grant(&h, |_| {}).await;

        h.shares.fail_record_view(true);
        let shared = h.resolver.resolve(&token, ClientInfo::default()).await;
        assert!(shared.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_appends_access_log_entry() {
        let h = harness();
        let token = seed_grant(&h, |_| {}).await;

        let client = ClientInfo {
            ip: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        h.resolver.resolve(&token, client).await.unwrap();

        // The append runs on a spawned task; give it a moment.
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        let grant = h.shares.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(h.access_log.count_for_grant(grant.id).await.unwrap(), 1);
        let entries = h.access_log.entries.lock().unwrap();
        assert_eq!(entries[0].client_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(entries[0].user_agent.as_deref(), Some("Mozilla/5.0"));
    }
}
