//! Storage abstraction traits
//!
//! Both storage backends are consumed through these traits so the upload
//! pipeline and share issuer never couple to a concrete provider.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A folder in the originals store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

/// A stored object in the originals store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub id: String,
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// Full-resolution originals store.
///
/// Folder-oriented: each property gets one folder (found-or-created by name,
/// so concurrent callers converge on the same folder), and each share grant
/// that includes high-quality copies gets a dedicated folder cloned from the
/// property's current originals. Uploaded objects are publicly readable.
#[async_trait]
pub trait OriginalsStore: Send + Sync {
    /// Find a folder by name under `parent`, creating it if absent.
    /// Idempotent: two concurrent calls with the same name return the same folder.
    async fn find_or_create_folder(
        &self,
        parent: Option<&str>,
        name: &str,
    ) -> StorageResult<Folder>;

    /// Upload a file into a folder; the returned object is publicly readable.
    async fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject>;

    /// Copy an existing file into another folder; returns the new file id.
    async fn copy_to_folder(&self, file_id: &str, folder_id: &str) -> StorageResult<String>;

    /// Delete a file. A missing file is success (idempotent delete).
    async fn delete_file(&self, file_id: &str) -> StorageResult<()>;

    /// Delete a folder and everything in it. Missing folder is success.
    async fn delete_folder(&self, folder_id: &str) -> StorageResult<()>;

    /// List the files in a folder.
    async fn list_folder(&self, folder_id: &str) -> StorageResult<Vec<StoredObject>>;

    /// Public URL for a stored file.
    fn public_url(&self, file_id: &str) -> String;
}

/// Thumbnail store: path-keyed blobs served over a public URL.
#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Upload a blob to `path`; returns the stored path.
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>)
        -> StorageResult<String>;

    /// Public URL for a stored path.
    fn public_url(&self, path: &str) -> String;

    /// Remove a blob. A missing blob is success (idempotent delete).
    async fn remove(&self, path: &str) -> StorageResult<()>;
}
