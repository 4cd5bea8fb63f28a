//! Application assembly: telemetry, database pool, storage backends,
//! services, router.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use propmedia_core::Config;
use propmedia_db::{
    AccessLogRepository, AssetRepository, PgAccessLogRepository, PgAssetRepository,
    PgPropertyRepository, PgShareRepository, PropertyRepository, ShareRepository,
};
use propmedia_services::{GalleryService, ShareIssuer, ShareResolver, UploadPipeline};

use crate::state::{AppState, MediaState, ShareState};

pub async fn initialize_app(config: Config) -> anyhow::Result<Router> {
    let pool = database::init_database(&config).await?;
    let (originals, thumbnails) = storage::init_storage(&config).await?;

    let assets: Arc<dyn AssetRepository> = Arc::new(PgAssetRepository::new(pool.clone()));
    let shares: Arc<dyn ShareRepository> = Arc::new(PgShareRepository::new(pool.clone()));
    let access_log: Arc<dyn AccessLogRepository> =
        Arc::new(PgAccessLogRepository::new(pool.clone()));
    let properties: Arc<dyn PropertyRepository> = Arc::new(PgPropertyRepository::new(pool.clone()));

    let upload = Arc::new(UploadPipeline::new(
        assets.clone(),
        originals.clone(),
        thumbnails.clone(),
    ));
    let gallery = Arc::new(GalleryService::new(
        assets.clone(),
        originals.clone(),
        thumbnails.clone(),
    ));
    let issuer = Arc::new(ShareIssuer::new(
        shares.clone(),
        assets.clone(),
        access_log.clone(),
        properties.clone(),
        originals.clone(),
        config.public_origin().to_string(),
        config.share_parent_folder().to_string(),
    ));
    let resolver = Arc::new(ShareResolver::new(
        shares,
        assets,
        properties.clone(),
        access_log,
    ));

    let state = AppState {
        config,
        pool,
        media: MediaState {
            upload,
            gallery,
            properties,
        },
        sharing: ShareState { issuer, resolver },
    };

    Ok(routes::build_router(state))
}
