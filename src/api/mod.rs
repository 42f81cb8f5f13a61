//! API Module
//!
//! HTTP handlers and routing for the proxy REST API.
//!
//! # Endpoints
//! - `GET /health`, `GET /health/ready`, `GET /health/live` - health probes
//! - `GET /api/netsuite/:entity` - list records (cached)
//! - `POST /api/netsuite/:entity/query` - run a SuiteQL query
//! - `GET /api/netsuite/:entity/:id` - fetch one record
//! - `GET /api/netsuite/:entity/:id/:sublist` - fetch a record sublist
//! - `DELETE /api/netsuite/cache` - clear the cache
//! - `GET /api/netsuite/cache/stats` - cache statistics

pub mod auth;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
