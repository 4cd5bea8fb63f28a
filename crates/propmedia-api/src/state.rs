//! Shared application state.
//!
//! The full state is split into sub-states so handlers only extract what they
//! use. Handlers take `State<MediaState>` or `State<ShareState>` via `FromRef`.

use std::sync::Arc;

use axum::extract::FromRef;
use propmedia_core::Config;
use propmedia_db::PropertyRepository;
use propmedia_services::{GalleryService, ShareIssuer, ShareResolver, UploadPipeline};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub media: MediaState,
    pub sharing: ShareState,
}

/// Upload and gallery handlers' slice of the state.
#[derive(Clone)]
pub struct MediaState {
    pub upload: Arc<UploadPipeline>,
    pub gallery: Arc<GalleryService>,
    pub properties: Arc<dyn PropertyRepository>,
}

/// Share issuing and resolution handlers' slice of the state.
#[derive(Clone)]
pub struct ShareState {
    pub issuer: Arc<ShareIssuer>,
    pub resolver: Arc<ShareResolver>,
}

impl FromRef<AppState> for MediaState {
    fn from_ref(state: &AppState) -> Self {
        state.media.clone()
    }
}

impl FromRef<AppState> for ShareState {
    fn from_ref(state: &AppState) -> Self {
        state.sharing.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
