//! Request and Response models for the proxy API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ListRecordsParams, QueryRequest};
pub use responses::{
    ClearCacheResponse, ErrorResponse, HealthChecks, HealthResponse, QueryResponse,
    ReadinessResponse, RecordsResponse, StatsResponse, StatusResponse,
};
