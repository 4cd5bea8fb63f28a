//! Domain models: properties, media assets, share grants, access log entries.

pub mod access_log;
pub mod media_asset;
pub mod property;
pub mod share;

pub use access_log::AccessLogEntry;
pub use media_asset::{BatchUploadResult, MediaAsset, NewMediaAsset, UploadFailure};
pub use property::{Property, RedactedProperty};
pub use share::{
    GrantStatus, NewShareGrant, ShareGrant, ShareGrantSummary, ShareOptions, ShareOptionsPatch,
    ShareStatistics, SharedProperty,
};
