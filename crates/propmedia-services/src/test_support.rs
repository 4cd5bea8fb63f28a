//! In-memory repositories and fixtures for service tests.
//!
//! The fakes mirror the Postgres repositories' observable behavior, including
//! the ordering/primary invariants and reorder validation, so services can be
//! exercised without a database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use propmedia_core::{
    models::{
        AccessLogEntry, MediaAsset, NewMediaAsset, NewShareGrant, Property, ShareGrant,
        ShareOptionsPatch,
    },
    AppError,
};
use propmedia_db::{AccessLogRepository, AssetRepository, PropertyRepository, ShareRepository};
use propmedia_storage::{
    Folder, OriginalsStore, StorageError, StorageResult, StoredObject, ThumbnailStore,
};
use uuid::Uuid;

use crate::upload::UploadFile;

// ---------------------------------------------------------------------------
// Image fixtures

fn encoded_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 150]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

pub fn png_file(name: &str, width: u32, height: u32) -> UploadFile {
    UploadFile {
        filename: name.to_string(),
        content_type: "image/png".to_string(),
        data: encoded_image(width, height, image::ImageFormat::Png),
    }
}

pub fn jpeg_file(name: &str, width: u32, height: u32) -> UploadFile {
    UploadFile {
        filename: name.to_string(),
        content_type: "image/jpeg".to_string(),
        data: encoded_image(width, height, image::ImageFormat::Jpeg),
    }
}

pub fn sample_property(id: Uuid) -> Property {
    Property {
        id,
        name: "Sunny Villa 3F".to_string(),
        address: Some("12 Harbor Road".to_string()),
        description: Some("Bright corner unit".to_string()),
        property_type: Some("apartment".to_string()),
        area_m2: Some(84.5),
        rooms: Some(3),
        price: Some(520_000_000),
        sale_price: Some(510_000_000),
        jeonse_deposit: Some(300_000_000),
        monthly_deposit: Some(20_000_000),
        monthly_rent: Some(1_200_000),
        manager_phone: Some("010-1111-2222".to_string()),
        co_broker_phone: Some("010-3333-4444".to_string()),
        owner_name: Some("Kim".to_string()),
        owner_phone: Some("010-5555-6666".to_string()),
        owner_id_number: Some("801010-1234567".to_string()),
        contact_relationship: Some("owner".to_string()),
        created_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Asset repository fake

#[derive(Default)]
pub struct InMemoryAssetRepository {
    rows: Mutex<Vec<MediaAsset>>,
    fail_inserts: AtomicBool,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail, for compensation tests.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Insert a row verbatim, bypassing invariant upkeep. Lets tests build
    /// historical states (e.g. no primary flagged) directly.
    pub fn push_raw(&self, asset: MediaAsset) {
        self.rows.lock().unwrap().push(asset);
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn insert(&self, asset: NewMediaAsset) -> Result<MediaAsset, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected insert failure".to_string()));
        }
        let row = MediaAsset {
            id: Uuid::new_v4(),
            property_id: asset.property_id,
            original_file_id: asset.original_file_id,
            original_folder_id: asset.original_folder_id,
            original_url: asset.original_url,
            thumbnail_path: asset.thumbnail_path,
            thumbnail_url: asset.thumbnail_url,
            original_filename: asset.original_filename,
            file_size: asset.file_size,
            content_type: asset.content_type,
            display_order: asset.display_order,
            is_primary: asset.is_primary,
            uploaded_by: asset.uploaded_by,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<MediaAsset>, AppError> {
        let mut rows: Vec<MediaAsset> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.property_id == property_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.display_order);
        Ok(rows)
    }

    async fn next_display_order(&self, property_id: Uuid) -> Result<i32, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.property_id == property_id)
            .map(|a| a.display_order)
            .max()
            .unwrap_or(0)
            + 1)
    }

    async fn reorder(
        &self,
        property_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<MediaAsset>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let current: HashSet<Uuid> = rows
            .iter()
            .filter(|a| a.property_id == property_id)
            .map(|a| a.id)
            .collect();
        let requested: HashSet<Uuid> = ordered_ids.iter().copied().collect();
        if requested.len() != ordered_ids.len() || current != requested {
            return Err(AppError::InvalidInput(
                "Reorder request must list exactly the property's current assets".to_string(),
            ));
        }
        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(row) = rows.iter_mut().find(|a| a.id == *id) {
                row.display_order = index as i32 + 1;
            }
        }
        let mut result: Vec<MediaAsset> = rows
            .iter()
            .filter(|a| a.property_id == property_id)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.display_order);
        Ok(result)
    }

    async fn set_primary(&self, property_id: Uuid, asset_id: Uuid) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows
            .iter()
            .any(|a| a.id == asset_id && a.property_id == property_id)
        {
            return Err(AppError::NotFound(format!(
                "Asset {asset_id} not found for property {property_id}"
            )));
        }
        for row in rows.iter_mut().filter(|a| a.property_id == property_id) {
            row.is_primary = row.id == asset_id;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(pos) = rows.iter().position(|a| a.id == id) else {
            return Ok(());
        };
        let removed = rows.remove(pos);
        for row in rows
            .iter_mut()
            .filter(|a| a.property_id == removed.property_id)
        {
            if row.display_order > removed.display_order {
                row.display_order -= 1;
            }
        }
        if removed.is_primary {
            if let Some(lowest) = rows
                .iter_mut()
                .filter(|a| a.property_id == removed.property_id)
                .min_by_key(|a| a.display_order)
            {
                lowest.is_primary = true;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Share repository fake

#[derive(Default)]
pub struct InMemoryShareRepository {
    rows: Mutex<Vec<ShareGrant>>,
    fail_record_view: AtomicBool,
    /// When set, deleting a grant also drops its access log rows, matching
    /// the FK cascade.
    cascade: Option<Arc<InMemoryAccessLogRepository>>,
}

impl InMemoryShareRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cascade(access_log: Arc<InMemoryAccessLogRepository>) -> Self {
        Self {
            cascade: Some(access_log),
            ..Self::default()
        }
    }

    pub fn fail_record_view(&self, fail: bool) {
        self.fail_record_view.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ShareRepository for InMemoryShareRepository {
    async fn insert(&self, grant: NewShareGrant) -> Result<ShareGrant, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|g| g.token == grant.token) {
            return Err(AppError::Internal("duplicate token".to_string()));
        }
        let row = ShareGrant {
            id: Uuid::new_v4(),
            property_id: grant.property_id,
            token: grant.token,
            share_folder_id: grant.share_folder_id,
            include_high_quality: grant.include_high_quality,
            expires_at: grant.expires_at,
            view_limit: grant.view_limit,
            view_count: 0,
            hide_contact: grant.hide_contact,
            hide_price: grant.hide_price,
            hide_owner_info: grant.hide_owner_info,
            custom_message: grant.custom_message,
            created_by: grant.created_by,
            created_at: Utc::now(),
            last_viewed_at: None,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ShareGrant>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == id)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareGrant>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.token == token)
            .cloned())
    }

    async fn list_for_property(&self, property_id: Uuid) -> Result<Vec<ShareGrant>, AppError> {
        let mut rows: Vec<ShareGrant> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.property_id == property_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn record_view(&self, id: Uuid) -> Result<(), AppError> {
        if self.fail_record_view.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "injected record_view failure".to_string(),
            ));
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|g| g.id == id) {
            row.view_count += 1;
            row.last_viewed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_options(
        &self,
        id: Uuid,
        patch: ShareOptionsPatch,
    ) -> Result<ShareGrant, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Share grant {id} not found")))?;
        if let Some(expires_at) = patch.expires_at {
            row.expires_at = expires_at;
        }
        if let Some(view_limit) = patch.view_limit {
            row.view_limit = view_limit;
        }
        if let Some(hide_contact) = patch.hide_contact {
            row.hide_contact = hide_contact;
        }
        if let Some(hide_price) = patch.hide_price {
            row.hide_price = hide_price;
        }
        if let Some(hide_owner_info) = patch.hide_owner_info {
            row.hide_owner_info = hide_owner_info;
        }
        if let Some(custom_message) = patch.custom_message {
            row.custom_message = custom_message;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.rows.lock().unwrap().retain(|g| g.id != id);
        if let Some(ref log) = self.cascade {
            log.entries.lock().unwrap().retain(|e| e.grant_id != id);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Access log fake

#[derive(Default)]
pub struct InMemoryAccessLogRepository {
    pub entries: Mutex<Vec<AccessLogEntry>>,
}

impl InMemoryAccessLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessLogRepository for InMemoryAccessLogRepository {
    async fn append(
        &self,
        grant_id: Uuid,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AccessLogEntry, AppError> {
        let entry = AccessLogEntry {
            id: Uuid::new_v4(),
            grant_id,
            accessed_at: Utc::now(),
            client_ip,
            user_agent,
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn count_for_grant(&self, grant_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.grant_id == grant_id)
            .count() as i64)
    }
}

// ---------------------------------------------------------------------------
// Property repository fake

#[derive(Default)]
pub struct InMemoryPropertyRepository {
    rows: Mutex<Vec<Property>>,
}

impl InMemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, property: Property) {
        self.rows.lock().unwrap().push(property);
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Failure-injecting stores

/// Thumbnail store whose uploads always fail; deletes succeed.
pub struct RejectingThumbnailStore;

#[async_trait]
impl ThumbnailStore for RejectingThumbnailStore {
    async fn upload(
        &self,
        _path: &str,
        _content_type: &str,
        _data: Vec<u8>,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed(
            "injected thumbnail failure".to_string(),
        ))
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://localhost/thumbnails/{path}")
    }

    async fn remove(&self, _path: &str) -> StorageResult<()> {
        Ok(())
    }
}

/// Originals store that delegates to an inner store but fails
/// `copy_to_folder` after a set number of successful copies.
pub struct CopyFailingOriginalsStore<S> {
    inner: S,
    fail_after: usize,
    copies: AtomicUsize,
}

impl<S> CopyFailingOriginalsStore<S> {
    pub fn new(inner: S, fail_after: usize) -> Self {
        Self {
            inner,
            fail_after,
            copies: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<S: OriginalsStore> OriginalsStore for CopyFailingOriginalsStore<S> {
    async fn find_or_create_folder(
        &self,
        parent: Option<&str>,
        name: &str,
    ) -> StorageResult<Folder> {
        self.inner.find_or_create_folder(parent, name).await
    }

    async fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        self.inner.upload(folder_id, filename, content_type, data).await
    }

    async fn copy_to_folder(&self, file_id: &str, folder_id: &str) -> StorageResult<String> {
        if self.copies.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
            return Err(StorageError::CopyFailed(
                "injected copy failure".to_string(),
            ));
        }
        self.inner.copy_to_folder(file_id, folder_id).await
    }

    async fn delete_file(&self, file_id: &str) -> StorageResult<()> {
        self.inner.delete_file(file_id).await
    }

    async fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        self.inner.delete_folder(folder_id).await
    }

    async fn list_folder(&self, folder_id: &str) -> StorageResult<Vec<StoredObject>> {
        self.inner.list_folder(folder_id).await
    }

    fn public_url(&self, file_id: &str) -> String {
        self.inner.public_url(file_id)
    }
}
