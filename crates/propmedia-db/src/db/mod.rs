//! Repository implementations for the media and sharing tables.
//!
//! Each repository owns one table. The traits in [`traits`] are the surface
//! the service layer consumes; the `Pg*` types here implement them against
//! Postgres. Multi-step mutations that must not expose intermediate states
//! (reorder, primary promotion, order compaction) run inside a single
//! transaction via [`transaction::with_transaction`].

pub mod access_log;
pub mod asset;
pub mod property;
pub mod share;
pub mod traits;
pub mod transaction;

pub use access_log::PgAccessLogRepository;
pub use asset::PgAssetRepository;
pub use property::PgPropertyRepository;
pub use share::PgShareRepository;
pub use traits::{AccessLogRepository, AssetRepository, PropertyRepository, ShareRepository};
