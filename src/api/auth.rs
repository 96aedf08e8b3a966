//! API key check for the inbox and refresh routes.

use crate::api::{ApiError, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Default)]
pub struct ApiKeyAuth {
    api_keys: Arc<Vec<String>>,
}

impl ApiKeyAuth {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            api_keys: Arc::new(api_keys),
        }
    }

    /// Always false when no keys are configured.
    pub fn is_valid(&self, key: &str) -> bool {
        self.api_keys.iter().any(|k| k == key)
    }
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match api_key {
        Some(key) if state.auth.is_valid(key) => Ok(next.run(request).await),
        Some(_) => {
            warn!("Invalid API key for {}", request.uri().path());
            Err(ApiError::Unauthorized)
        }
        None => {
            warn!("Missing API key for {}", request.uri().path());
            Err(ApiError::Unauthorized)
        }
    }
}
