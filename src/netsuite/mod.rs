//! NetSuite Module
//!
//! Signed access to the NetSuite REST record and SuiteQL APIs.

pub mod client;
pub mod executor;
pub mod oauth;
pub mod params;

pub use client::{Endpoints, FetchResult, Fetched, ListQuery, NetSuiteClient, Sublist};
pub use executor::{backoff_delay, RequestExecutor, Sleeper, TokioSleeper};
pub use oauth::{Credential, OAuthStamp, SignedRequest};
pub use params::Params;
