//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Proxy Error Enum ==
/// Unified error type for upstream calls and request handling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProxyError {
    /// Required NetSuite settings are missing or empty
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Every attempt hit the per-attempt timeout
    #[error("Request timeout after {attempts} attempts")]
    RequestTimeout { attempts: u32 },

    /// Retryable connection failures used up the attempt budget
    #[error("Retries exhausted after {attempts} attempts: {cause}")]
    RetriesExhausted { attempts: u32, cause: String },

    /// Transport failure that is not worth retrying
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream kept answering 429
    #[error("NetSuite API error (429): rate limited after {attempts} attempts. {body}")]
    RateLimited { attempts: u32, body: String },

    /// Upstream answered with a non-retryable error status
    #[error("NetSuite API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Upstream body could not be decoded
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Caller supplied bad input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller failed API key authentication
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl ProxyError {
    /// Returns the upstream HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProxyError::Upstream { status, .. } => Some(*status),
            ProxyError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;

// == Cache Error Enum ==
/// Storage-level failures inside the cache. Never leaves the cache module
/// boundary; `CacheManager` turns these into `None`/`false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Key rejected by the store
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

// == API Error ==
/// HTTP-facing wrapper around [`ProxyError`].
///
/// `expose_details` controls whether the underlying message is echoed back
/// to the caller (it is hidden in production).
#[derive(Debug)]
pub struct ApiError {
    pub error: ProxyError,
    pub expose_details: bool,
}

impl ApiError {
    pub fn new(error: ProxyError, expose_details: bool) -> Self {
        Self {
            error,
            expose_details,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match &self.error {
            ProxyError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg.clone()),
            ProxyError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg.clone()),
            ProxyError::Configuration(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                "NetSuite credentials are not configured".to_string(),
            ),
            ProxyError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate Limit Exceeded",
                "NetSuite rate limit exceeded. Please try again later.".to_string(),
            ),
            ProxyError::Upstream { status: 401, .. } => (
                StatusCode::UNAUTHORIZED,
                "Authentication Failed",
                "NetSuite authentication failed. Check credentials.".to_string(),
            ),
            ProxyError::Upstream { status: 404, .. } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "Requested resource not found in NetSuite".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Failed to fetch data from NetSuite".to_string(),
            ),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(error: ProxyError) -> Self {
        Self::new(error, true)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        let details = self.expose_details.then(|| self.error.to_string());

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProxyError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (ProxyError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ProxyError::Configuration("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                ProxyError::RateLimited {
                    attempts: 3,
                    body: String::new(),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ProxyError::Upstream {
                    status: 401,
                    body: String::new(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                ProxyError::Upstream {
                    status: 404,
                    body: String::new(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ProxyError::Upstream {
                    status: 500,
                    body: String::new(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ProxyError::RequestTimeout { attempts: 3 }, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let response = ApiError::new(error, false).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_upstream_message_embeds_status_and_body() {
        let err = ProxyError::Upstream {
            status: 400,
            body: "bad field".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("bad field"));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_timeout_message_names_attempts() {
        let err = ProxyError::RequestTimeout { attempts: 3 };
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(err.status(), None);
    }
}
