//! Router assembly and middleware layers.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use propmedia_core::constants::API_PREFIX;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, images, shared_view, shares};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.config.cors_origins());

    // Batch uploads carry several files per request.
    let max_body = state.config.max_image_file_size() * 20;

    let api = Router::new()
        .route(
            "/properties/{id}/images",
            post(images::upload_images).get(images::list_images),
        )
        .route("/properties/{id}/images/order", put(images::reorder_images))
        .route(
            "/properties/{id}/images/{asset_id}/primary",
            put(images::set_primary_image),
        )
        .route("/images/{id}", delete(images::delete_image))
        .route(
            "/properties/{id}/shares",
            post(shares::issue_share).get(shares::list_shares),
        )
        .route(
            "/properties/{id}/shares/statistics",
            get(shares::share_statistics),
        )
        .route(
            "/shares/{id}",
            patch(shares::update_share).delete(shares::revoke_share),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .route("/share/{token}", get(shared_view::resolve_share))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
