//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth::require_api_key;
use super::handlers::{
    cache_stats_handler, clear_cache_handler, health_handler, list_records_handler,
    liveness_handler, not_found_handler, query_handler, readiness_handler, record_handler,
    sublist_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// Health probes stay public; everything under `/api` goes through the
/// API key check.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static cache routes sit beside the `:entity` routes; the router prefers static segments.
    let api = Router::new()
        .route("/api/netsuite/cache", delete(clear_cache_handler))
        .route("/api/netsuite/cache/stats", get(cache_stats_handler))
        .route("/api/netsuite/:entity", get(list_records_handler))
        .route("/api/netsuite/:entity/query", post(query_handler))
        .route("/api/netsuite/:entity/:id", get(record_handler))
        .route("/api/netsuite/:entity/:id/:sublist", get(sublist_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/health/live", get(liveness_handler))
        .merge(api)
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
