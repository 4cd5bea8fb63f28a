//! Subsystem-wide constants.

/// Maximum accepted upload size per image file (10 MiB).
pub const MAX_IMAGE_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted by the upload pipeline. `image/jpg` is a
/// widely-sent non-standard alias for `image/jpeg` and is accepted too.
pub const ALLOWED_IMAGE_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Thumbnails are scaled down (never up) to fit within this box.
pub const THUMBNAIL_MAX_WIDTH: u32 = 400;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 300;

/// JPEG quality for re-encoded thumbnails (0-100).
pub const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Share capability tokens: raw random bytes before hex encoding.
/// 32 bytes gives a 64-character token; guessing is infeasible.
pub const SHARE_TOKEN_BYTES: usize = 32;

/// Versioned API prefix for staff-facing endpoints.
pub const API_PREFIX: &str = "/api/v0";
