//! HTTP API: routes, shared state and error mapping.
//!
//! Routes:
//! - GET  /             - Site visit, catalog size
//! - GET  /health       - Health check
//! - GET  /autocomplete - Labels matching `term`
//! - POST /buy          - Price per unit for one crop
//! - POST /barter       - Compare two crops
//! - POST /feedback     - Leave a message
//! - GET  /inbox        - Feedback and usage statistics (API key)
//! - POST /refresh      - Reload the price list (API key)

pub mod auth;
pub mod error;
pub mod handlers;

pub use auth::ApiKeyAuth;
pub use error::ApiError;

use crate::catalog::SharedCatalog;
use crate::storage::SqliteStorage;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// State shared by all handlers.
pub struct AppState {
    pub catalog: SharedCatalog,
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub auth: ApiKeyAuth,
    pub refresh_notify: Arc<Notify>,
}

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let protected = Router::new()
        .route("/inbox", get(handlers::inbox))
        .route("/refresh", post(handlers::refresh))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/autocomplete", get(handlers::autocomplete))
        .route("/buy", post(handlers::buy))
        .route("/barter", post(handlers::barter))
        .route("/feedback", post(handlers::feedback))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
