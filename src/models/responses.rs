//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::netsuite::FetchResult;

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Response body for `GET /api/netsuite/:entity`
#[derive(Debug, Clone, Serialize)]
pub struct RecordsResponse {
    #[serde(flatten)]
    pub result: FetchResult,
    /// Whether the result came from the cache
    pub cached: bool,
    pub timestamp: String,
}

impl RecordsResponse {
    pub fn new(result: FetchResult, cached: bool) -> Self {
        Self {
            result,
            cached,
            timestamp: now_rfc3339(),
        }
    }
}

/// Response body for `POST /api/netsuite/:entity/query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub result: FetchResult,
    pub timestamp: String,
}

impl QueryResponse {
    pub fn new(result: FetchResult) -> Self {
        Self {
            result,
            timestamp: now_rfc3339(),
        }
    }
}

/// Response body for the stats endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            size: stats.size,
            max_size: stats.max_size,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
        }
    }
}

/// Response body for `DELETE /api/netsuite/cache`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResponse {
    pub message: String,
    /// Statistics captured just before clearing
    pub previous_stats: StatsResponse,
}

impl ClearCacheResponse {
    pub fn new(previous_stats: StatsResponse) -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            previous_stats,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfiguredCheck {
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnabledCheck {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub netsuite: ConfiguredCheck,
    pub auth: EnabledCheck,
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since startup, e.g. `"42s"`
    pub uptime: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub checks: HealthChecks,
}

impl HealthResponse {
    pub fn ok(uptime_secs: u64, netsuite_configured: bool, auth_enabled: bool) -> Self {
        Self {
            status: "ok".to_string(),
            uptime: format!("{}s", uptime_secs),
            timestamp: now_rfc3339(),
            service: env!("CARGO_PKG_NAME").replace('_', "-"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks {
                netsuite: ConfiguredCheck {
                    configured: netsuite_configured,
                },
                auth: EnabledCheck {
                    enabled: auth_enabled,
                },
            },
        }
    }
}

/// Response body for `GET /health/ready`
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReadinessResponse {
    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
            reason: None,
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            status: "not ready".to_string(),
            reason: Some(reason.into()),
        }
    }
}

/// Bare `{status}` body, used by liveness.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn alive() -> Self {
        Self {
            status: "alive".to_string(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Short error category, e.g. "Not Found"
    pub error: String,
    pub message: String,
    /// Underlying error text, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
