use std::sync::Arc;

use propmedia_core::config::ThumbnailBackend;
use propmedia_core::Config;
use propmedia_storage::{
    LocalOriginalsStore, LocalThumbnailStore, OriginalsStore, S3ThumbnailStore, ThumbnailStore,
};

/// Build both storage backends. Originals are always on the local filesystem;
/// thumbnails go local or to S3 per configuration.
pub async fn init_storage(
    config: &Config,
) -> anyhow::Result<(Arc<dyn OriginalsStore>, Arc<dyn ThumbnailStore>)> {
    let originals: Arc<dyn OriginalsStore> = Arc::new(
        LocalOriginalsStore::new(
            config.originals_path(),
            config.originals_base_url().to_string(),
        )
        .await?,
    );

    let thumbnails: Arc<dyn ThumbnailStore> = match config.thumbnail_backend() {
        ThumbnailBackend::Local => Arc::new(
            LocalThumbnailStore::new(
                config.thumbnails_path(),
                config.thumbnails_base_url().to_string(),
            )
            .await?,
        ),
        ThumbnailBackend::S3 => {
            // Config::from_env has already required S3_BUCKET for this backend.
            let bucket = config
                .s3_bucket()
                .ok_or_else(|| anyhow::anyhow!("S3_BUCKET must be set for the s3 backend"))?;
            Arc::new(
                S3ThumbnailStore::new(
                    bucket.to_string(),
                    config.s3_region().unwrap_or("us-east-1").to_string(),
                    config.s3_endpoint().map(String::from),
                )
                .await?,
            )
        }
    };

    tracing::info!(backend = ?config.thumbnail_backend(), "Storage backends initialized");

    Ok((originals, thumbnails))
}
