//! API key authentication
//!
//! Guards the `/api` routes. The key may arrive in the `X-API-Key` header or
//! the `api_key` query parameter; the header wins when both are present.

use axum::{
    extract::{Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::warn;

use super::handlers::AppState;
use crate::error::{ApiError, ProxyError};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Middleware rejecting requests without the configured API key.
///
/// A state without a key lets every request through.
pub async fn require_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ApiKeyQuery>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or(query.api_key);

    match provided {
        None => Err(state.reject(ProxyError::Unauthorized(
            "Missing API key. Provide via X-API-Key header or api_key query parameter."
                .to_string(),
        ))),
        Some(key) if key != expected => {
            warn!(path = %request.uri().path(), "invalid API key attempt");
            Err(state.reject(ProxyError::Unauthorized("Invalid API key".to_string())))
        }
        Some(_) => Ok(next.run(request).await),
    }
}
