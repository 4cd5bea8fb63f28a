//! Service layer: upload pipeline, gallery management and secure sharing.
//!
//! Services orchestrate the storage backends and repositories behind the HTTP
//! surface. They hold `Arc<dyn ...>` repository and store handles, so tests
//! run them against in-memory repositories and tempdir-backed stores.

pub mod gallery;
pub mod share;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use gallery::GalleryService;
pub use share::issuer::{IssuedShare, ShareIssuer};
pub use share::resolver::{ClientInfo, ShareResolver};
pub use upload::{UploadFile, UploadPipeline};
