//! melo-ls library interface
//!
//! Exposes the search pipeline and router for the binary and integration tests.

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod search;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::search::LyricsSearch;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<LyricsSearch>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(search: LyricsSearch) -> Self {
        Self {
            search: Arc::new(search),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::search_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
