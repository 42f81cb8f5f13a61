//! NetSuite Proxy - OAuth 1.0a signing proxy for the NetSuite REST API
//!
//! Signs requests with token-based authentication, retries transient
//! failures, expands list results into full records and memoizes results
//! in a TTL + LRU cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod netsuite;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{ProxyError, Result};
pub use netsuite::NetSuiteClient;
pub use tasks::spawn_cleanup_task;
