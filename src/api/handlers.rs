//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::{ApiError, ProxyError};
use crate::models::requests::validate_entity;
use crate::models::{
    ClearCacheResponse, ErrorResponse, HealthResponse, ListRecordsParams, QueryRequest,
    QueryResponse, ReadinessResponse, RecordsResponse, StatsResponse, StatusResponse,
};
use crate::netsuite::{FetchResult, NetSuiteClient, Sublist};

/// Application state shared across all handlers.
///
/// Built once at startup; the cache and client are shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Memoized list results
    pub cache: CacheManager<FetchResult>,
    /// `None` when NetSuite credentials are not configured
    pub client: Option<Arc<NetSuiteClient>>,
    /// Key callers must present; `None` disables authentication
    pub api_key: Option<String>,
    /// Echo underlying error text in error bodies
    pub expose_error_details: bool,
    pub started_at: Instant,
}

impl AppState {
    /// Creates a state with authentication disabled and error details exposed.
    pub fn new(cache: CacheManager<FetchResult>, client: Option<NetSuiteClient>) -> Self {
        Self {
            cache,
            client: client.map(Arc::new),
            api_key: None,
            expose_error_details: true,
            started_at: Instant::now(),
        }
    }

    /// Requires callers to present `api_key`; an empty key keeps auth disabled.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Missing credentials leave the client unset instead of failing startup;
    /// readiness then reports not ready.
    pub fn from_config(config: &Config) -> Self {
        let cache = CacheManager::new(
            config.cache_max_entries,
            Duration::from_secs(config.cache_ttl),
        );
        let client = if !config.netsuite_configured() {
            warn!("NetSuite credentials missing, data endpoints disabled");
            None
        } else {
            match NetSuiteClient::from_config(config) {
                Ok(client) => Some(client),
                Err(err) => {
                    warn!(error = %err, "NetSuite client not configured");
                    None
                }
            }
        };

        Self::new(cache, client)
            .with_api_key(config.api_key.clone())
            .with_error_details(!config.is_production())
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Wraps an error for the HTTP layer, honoring the details setting.
    pub fn reject(&self, error: ProxyError) -> ApiError {
        ApiError::new(error, self.expose_error_details)
    }

    fn client(&self) -> Result<&NetSuiteClient, ApiError> {
        self.client.as_deref().ok_or_else(|| {
            self.reject(ProxyError::Configuration(
                "Missing required NetSuite credentials".to_string(),
            ))
        })
    }

    fn check_entity(&self, entity: &str) -> Result<(), ApiError> {
        match validate_entity(entity) {
            Some(msg) => Err(self.reject(ProxyError::InvalidRequest(msg))),
            None => Ok(()),
        }
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(
        state.started_at.elapsed().as_secs(),
        state.client.is_some(),
        state.auth_enabled(),
    ))
}

/// Handler for GET /health/ready
///
/// Ready once a NetSuite client could be built.
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    if state.client.is_some() {
        (StatusCode::OK, Json(ReadinessResponse::ready()))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse::not_ready("Missing NetSuite credentials")),
        )
    }
}

/// Handler for GET /health/live
pub async fn liveness_handler() -> Json<StatusResponse> {
    Json(StatusResponse::alive())
}

/// Handler for GET /api/netsuite/:entity
///
/// Serves from the cache unless `no_cache` is set; fresh results are always cached.
pub async fn list_records_handler(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<ListRecordsParams>,
) -> Result<Json<RecordsResponse>, ApiError> {
    state.check_entity(&entity)?;

    let cache_key = params.cache_key(&entity);
    if !params.no_cache {
        if let Some(cached) = state.cache.get(&cache_key).await {
            info!(entity = %entity, "returning cached data");
            return Ok(Json(RecordsResponse::new(cached, true)));
        }
    }

    let client = state.client()?;
    info!(
        entity = %entity,
        limit = params.limit,
        offset = params.offset,
        expand = params.expand,
        "fetching records from NetSuite"
    );

    let result = client
        .list_records(&entity, &params.list_query(), params.expand)
        .await
        .map_err(|err| {
            error!(entity = %entity, error = %err, "error fetching NetSuite data");
            state.reject(err)
        })?;

    state.cache.set(&cache_key, result.clone(), None).await;
    Ok(Json(RecordsResponse::new(result, false)))
}

/// Handler for POST /api/netsuite/:entity/query
pub async fn query_handler(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if let Some(msg) = req.validate() {
        return Err(state.reject(ProxyError::InvalidRequest(msg)));
    }

    let client = state.client()?;
    info!(entity = %entity, query = %req.query, "executing SuiteQL query");

    let result = client
        .execute_query(&req.query, req.limit, req.offset)
        .await
        .map_err(|err| {
            error!(error = %err, "error executing SuiteQL query");
            state.reject(err)
        })?;

    Ok(Json(QueryResponse::new(result)))
}

/// Handler for GET /api/netsuite/:entity/:id
pub async fn record_handler(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.check_entity(&entity)?;
    let client = state.client()?;

    let record = client.get_record(&entity, &id).await.map_err(|err| {
        error!(entity = %entity, id = %id, error = %err, "error fetching NetSuite record");
        state.reject(err)
    })?;
    Ok(Json(record))
}

/// Handler for GET /api/netsuite/:entity/:id/:sublist
///
/// Always 200 once the client exists; a failed fetch yields an empty list.
pub async fn sublist_handler(
    State(state): State<AppState>,
    Path((entity, id, sublist)): Path<(String, String, String)>,
) -> Result<Json<Sublist>, ApiError> {
    state.check_entity(&entity)?;
    let client = state.client()?;

    let fetched = client.get_sublist(&entity, &id, &sublist).await;
    Ok(Json(fetched.into_inner()))
}

/// Handler for DELETE /api/netsuite/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let previous = StatsResponse::from(state.cache.stats().await);
    state.cache.clear().await;
    Json(ClearCacheResponse::new(previous))
}

/// Handler for GET /api/netsuite/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not Found".to_string(),
            message: "The requested endpoint does not exist".to_string(),
            details: None,
        }),
    )
}
