//! Client-side media processing: pre-I/O validation and thumbnail generation.
//!
//! Both run before any storage backend is touched, so a rejected or
//! undecodable file never causes a network write.

pub mod thumbnail;
pub mod validator;

pub use thumbnail::{Thumbnail, ThumbnailError, ThumbnailGenerator};
pub use validator::{ImageValidator, ValidationError};
