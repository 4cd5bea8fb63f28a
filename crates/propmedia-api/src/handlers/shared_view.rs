//! The anonymous share view. No auth: possession of the token is the
//! credential.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap},
    Json,
};
use propmedia_core::models::SharedProperty;
use propmedia_services::ClientInfo;

use crate::error::HttpAppError;
use crate::state::ShareState;
use crate::utils::ip_extraction::extract_client_ip;

pub async fn resolve_share(
    State(state): State<ShareState>,
    Path(token): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<SharedProperty>, HttpAppError> {
    let client = ClientInfo {
        ip: extract_client_ip(&headers, Some(&addr)),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };

    let shared = state.resolver.resolve(&token, client).await?;
    Ok(Json(shared))
}
