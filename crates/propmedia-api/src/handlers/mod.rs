//! HTTP handlers.
//!
//! Staff endpoints live under `/api/v0`; the anonymous share view is served
//! at `/share/{token}` on the root.

pub mod health;
pub mod images;
pub mod shared_view;
pub mod shares;

use axum::http::HeaderMap;
use uuid::Uuid;

/// Staff identity forwarded by the CRM gateway. Auth itself happens upstream;
/// a missing header attributes the action to the nil id.
pub(crate) fn staff_id(headers: &HeaderMap) -> Uuid {
    headers
        .get("x-staff-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(Uuid::nil())
}
