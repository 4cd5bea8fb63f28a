//! Configuration module
//!
//! Environment-driven configuration for the API binary and services:
//! database, both storage backends, upload limits, and share-link origin.

use std::env;

use crate::constants;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Which backend serves the thumbnail store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailBackend {
    Local,
    S3,
}

#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    environment: String,
    cors_origins: Vec<String>,

    database_url: String,
    db_max_connections: u32,
    db_timeout_seconds: u64,

    /// Origin used to build public share URLs, e.g. "https://crm.example.com".
    public_origin: String,

    // Originals store (full-resolution, folder-oriented)
    originals_path: String,
    originals_base_url: String,
    /// Folder name under which per-grant share folders are created.
    share_parent_folder: String,

    // Thumbnail store
    thumbnail_backend: ThumbnailBackend,
    thumbnails_path: String,
    thumbnails_base_url: String,
    s3_bucket: Option<String>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,

    // Upload limits
    max_image_file_size: usize,
    allowed_image_content_types: Vec<String>,
}

impl Config {
    /// Load configuration from the environment. `.env` files are honored.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let thumbnail_backend = match env::var("THUMBNAIL_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => ThumbnailBackend::S3,
            _ => ThumbnailBackend::Local,
        };

        if thumbnail_backend == ThumbnailBackend::S3 && env::var("S3_BUCKET").is_err() {
            anyhow::bail!("S3_BUCKET must be set when THUMBNAIL_BACKEND=s3");
        }

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: env_list("CORS_ORIGINS"),
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_CONNECTION_TIMEOUT_SECS),
            public_origin: env::var("PUBLIC_ORIGIN")
                .unwrap_or_else(|_| format!("http://localhost:{}", DEFAULT_SERVER_PORT)),
            originals_path: env::var("ORIGINALS_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/originals".to_string()),
            originals_base_url: env::var("ORIGINALS_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/originals".to_string()),
            share_parent_folder: env::var("SHARE_PARENT_FOLDER")
                .unwrap_or_else(|_| "shares".to_string()),
            thumbnail_backend,
            thumbnails_path: env::var("THUMBNAILS_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/thumbnails".to_string()),
            thumbnails_base_url: env::var("THUMBNAILS_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/thumbnails".to_string()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            max_image_file_size: env_parse(
                "MAX_IMAGE_FILE_SIZE",
                constants::MAX_IMAGE_FILE_SIZE,
            ),
            allowed_image_content_types: {
                let list = env_list("ALLOWED_IMAGE_CONTENT_TYPES");
                if list.is_empty() {
                    constants::ALLOWED_IMAGE_CONTENT_TYPES
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                } else {
                    list
                }
            },
        })
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn public_origin(&self) -> &str {
        &self.public_origin
    }

    pub fn originals_path(&self) -> &str {
        &self.originals_path
    }

    pub fn originals_base_url(&self) -> &str {
        &self.originals_base_url
    }

    pub fn share_parent_folder(&self) -> &str {
        &self.share_parent_folder
    }

    pub fn thumbnail_backend(&self) -> ThumbnailBackend {
        self.thumbnail_backend
    }

    pub fn thumbnails_path(&self) -> &str {
        &self.thumbnails_path
    }

    pub fn thumbnails_base_url(&self) -> &str {
        &self.thumbnails_base_url
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn max_image_file_size(&self) -> usize {
        self.max_image_file_size
    }

    pub fn allowed_image_content_types(&self) -> &[String] {
        &self.allowed_image_content_types
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
