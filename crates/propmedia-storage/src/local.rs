use crate::keys::validate_key;
use crate::traits::{
    Folder, OriginalsStore, StorageError, StorageResult, StoredObject, ThumbnailStore,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem originals store.
///
/// Folder ids and file ids are relative paths under `base_path`, which keeps
/// them stable across restarts and directly mappable to public URLs.
#[derive(Clone)]
pub struct LocalOriginalsStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalOriginalsStore {
    /// # Arguments
    /// * `base_path` - Root directory (e.g., "/var/lib/propmedia/originals")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/originals")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create originals directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalOriginalsStore {
            base_path,
            base_url,
        })
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl OriginalsStore for LocalOriginalsStore {
    async fn find_or_create_folder(
        &self,
        parent: Option<&str>,
        name: &str,
    ) -> StorageResult<Folder> {
        let key = match parent {
            Some(parent) => format!("{}/{}", parent, name),
            None => name.to_string(),
        };
        let path = self.key_to_path(&key)?;

        // create_dir_all is the find-or-create: it succeeds whether or not
        // the folder already exists, so concurrent callers converge.
        fs::create_dir_all(&path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to create folder {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Folder {
            id: key,
            name: name.to_string(),
        })
    }

    async fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let key = format!("{}/{}", folder_id, filename);
        let path = self.key_to_path(&key)?;
        let size = data.len() as u64;

        let start = std::time::Instant::now();
        self.write_file(&path, &data).await?;

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Originals upload successful"
        );

        Ok(StoredObject {
            id: key.clone(),
            name: filename.to_string(),
            url: self.generate_url(&key),
            size,
        })
    }

    async fn copy_to_folder(&self, file_id: &str, folder_id: &str) -> StorageResult<String> {
        let from_path = self.key_to_path(file_id)?;

        let filename = Path::new(file_id)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidKey(file_id.to_string()))?;
        let to_key = format!("{}/{}", folder_id, filename);
        let to_path = self.key_to_path(&to_key)?;

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(file_id.to_string()));
        }

        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            StorageError::CopyFailed(format!(
                "Failed to copy {} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })?;

        tracing::info!(
            from_key = %file_id,
            to_key = %to_key,
            "Originals copy successful"
        );

        Ok(to_key)
    }

    async fn delete_file(&self, file_id: &str) -> StorageResult<()> {
        let path = self.key_to_path(file_id)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %file_id, "Originals delete successful");

        Ok(())
    }

    async fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        let path = self.key_to_path(folder_id)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_dir_all(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to delete folder {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(key = %folder_id, "Originals folder delete successful");

        Ok(())
    }

    async fn list_folder(&self, folder_id: &str) -> StorageResult<Vec<StoredObject>> {
        let path = self.key_to_path(folder_id)?;

        let mut entries = fs::read_dir(&path).await.map_err(|e| {
            StorageError::BackendError(format!("Failed to list {}: {}", path.display(), e))
        })?;

        let mut objects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let key = format!("{}/{}", folder_id, name);
            objects.push(StoredObject {
                url: self.generate_url(&key),
                id: key,
                name,
                size: meta.len(),
            });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    fn public_url(&self, file_id: &str) -> String {
        self.generate_url(file_id)
    }
}

/// Local filesystem thumbnail store.
#[derive(Clone)]
pub struct LocalThumbnailStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalThumbnailStore {
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create thumbnail directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalThumbnailStore {
            base_path,
            base_url,
        })
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl ThumbnailStore for LocalThumbnailStore {
    async fn upload(
        &self,
        path: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let fs_path = self.key_to_path(path)?;
        let size = data.len();

        if let Some(parent) = fs_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&fs_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                fs_path.display(),
                e
            ))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                fs_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", fs_path.display(), e))
        })?;

        tracing::info!(
            path = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail upload successful"
        );

        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn remove(&self, path: &str) -> StorageResult<()> {
        let fs_path = self.key_to_path(path)?;

        if !fs::try_exists(&fs_path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&fs_path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                fs_path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path, "Thumbnail delete successful");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_find_or_create_folder_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = LocalOriginalsStore::new(dir.path(), "http://localhost/originals".to_string())
            .await
            .unwrap();

        let a = store
            .find_or_create_folder(None, "Sunny Villa_abc")
            .await
            .unwrap();
        let b = store
            .find_or_create_folder(None, "Sunny Villa_abc")
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_upload_and_list_folder() {
        let dir = tempdir().unwrap();
        let store = LocalOriginalsStore::new(dir.path(), "http://localhost/originals".to_string())
            .await
            .unwrap();

        let folder = store.find_or_create_folder(None, "prop").await.unwrap();
        let obj = store
            .upload(&folder.id, "01_front.jpg", "image/jpeg", b"jpeg bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(obj.size, 10);
        assert!(obj.url.ends_with("prop/01_front.jpg"));

        let listed = store.list_folder(&folder.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "01_front.jpg");
    }

    #[tokio::test]
    async fn test_copy_to_folder() {
        let dir = tempdir().unwrap();
        let store = LocalOriginalsStore::new(dir.path(), "http://localhost/originals".to_string())
            .await
            .unwrap();

        let folder = store.find_or_create_folder(None, "prop").await.unwrap();
        let share = store.find_or_create_folder(None, "share_tok").await.unwrap();
        let obj = store
            .upload(&folder.id, "a.jpg", "image/jpeg", b"data".to_vec())
            .await
            .unwrap();

        let copied = store.copy_to_folder(&obj.id, &share.id).await.unwrap();
        assert_eq!(copied, "share_tok/a.jpg");

        let listed = store.list_folder(&share.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_file_missing_is_success() {
        let dir = tempdir().unwrap();
        let store = LocalOriginalsStore::new(dir.path(), "http://localhost/originals".to_string())
            .await
            .unwrap();

        assert!(store.delete_file("prop/never-existed.jpg").await.is_ok());
        assert!(store.delete_folder("never-existed").await.is_ok());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalOriginalsStore::new(dir.path(), "http://localhost/originals".to_string())
            .await
            .unwrap();

        let result = store.delete_file("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store
            .upload("..", "x.jpg", "image/jpeg", b"x".to_vec())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_thumbnail_store_roundtrip_and_idempotent_remove() {
        let dir = tempdir().unwrap();
        let store = LocalThumbnailStore::new(dir.path(), "http://localhost/thumbnails".to_string())
            .await
            .unwrap();

        let path = store
            .upload("prop-1/thumb_1_a.jpg", "image/jpeg", b"thumb".to_vec())
            .await
            .unwrap();
        assert_eq!(path, "prop-1/thumb_1_a.jpg");
        assert_eq!(
            store.public_url(&path),
            "http://localhost/thumbnails/prop-1/thumb_1_a.jpg"
        );

        store.remove(&path).await.unwrap();
        // Second remove of a missing blob is still success.
        store.remove(&path).await.unwrap();
    }
}
