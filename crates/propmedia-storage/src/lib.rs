//! Storage backends for the media pipeline.
//!
//! Two independent abstractions: the [`OriginalsStore`] holds full-resolution
//! photos in named folders (per property, plus per-grant share folders), the
//! [`ThumbnailStore`] holds downscaled copies at CDN-style paths. The upload
//! pipeline writes to both; neither backend knows about the other.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

#[cfg(feature = "storage-local")]
pub use local::{LocalOriginalsStore, LocalThumbnailStore};
#[cfg(feature = "storage-s3")]
pub use s3::S3ThumbnailStore;
pub use traits::{Folder, OriginalsStore, StorageError, StorageResult, StoredObject, ThumbnailStore};
