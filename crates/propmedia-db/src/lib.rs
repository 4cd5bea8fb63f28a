//! Database repositories for the property media subsystem.

pub mod db;

pub use db::{
    AccessLogRepository, AssetRepository, PgAccessLogRepository, PgAssetRepository,
    PgPropertyRepository, PgShareRepository, PropertyRepository, ShareRepository,
};
