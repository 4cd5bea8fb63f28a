use crate::keys::validate_key;
use crate::traits::{StorageError, StorageResult, ThumbnailStore};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};

/// S3-backed thumbnail store.
///
/// Thumbnails are small public blobs served through a CDN in front of the
/// bucket, so only put/delete/public-url are needed here.
#[derive(Clone)]
pub struct S3ThumbnailStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3ThumbnailStore {
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3ThumbnailStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl ThumbnailStore for S3ThumbnailStore {
    async fn upload(
        &self,
        path: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        validate_key(path)?;
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(path.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %path,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 thumbnail upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 thumbnail upload successful"
        );

        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        self.generate_url(path)
    }

    async fn remove(&self, path: &str) -> StorageResult<()> {
        validate_key(path)?;
        let location = Path::from(path.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(_) => {}
            // Missing blob counts as removed.
            Err(ObjectStoreError::NotFound { .. }) => return Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 thumbnail delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 thumbnail delete successful"
        );

        Ok(())
    }
}
