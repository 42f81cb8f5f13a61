//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// NetSuite credentials default to empty; a client is only built once all five are set.
#[derive(Debug, Clone)]
pub struct Config {
    /// NetSuite account realm (e.g. `1234567_SB1`)
    pub realm: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token_key: String,
    pub token_secret: String,
    /// Override for the REST root, derived from the realm when unset
    pub base_url: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Deployment environment; `production` hides error details
    pub environment: String,
    /// Key callers must present; empty disables authentication
    pub api_key: String,
    /// Maximum number of entries the cache can hold
    pub cache_max_entries: usize,
    /// Default TTL in seconds for cached results
    pub cache_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Per-attempt upstream timeout in seconds
    pub request_timeout: u64,
    /// Attempt budget per upstream call
    pub max_attempts: u32,
    /// Detail fetches allowed in flight during list expansion
    pub detail_concurrency: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NETSUITE_REALM`, `NETSUITE_CONSUMER_KEY`, `NETSUITE_CONSUMER_SECRET`,
    ///   `NETSUITE_TOKEN_KEY`, `NETSUITE_TOKEN_SECRET` - credentials (default: empty)
    /// - `NETSUITE_BASE_URL` - REST root override (default: derived from realm)
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `ENVIRONMENT` - deployment environment (default: development)
    /// - `API_KEY` - caller API key (default: empty, auth disabled)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `REQUEST_TIMEOUT` - Per-attempt timeout in seconds (default: 30)
    /// - `MAX_ATTEMPTS` - Attempts per upstream call (default: 3)
    /// - `DETAIL_CONCURRENCY` - Parallel detail fetches (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            realm: env_string("NETSUITE_REALM"),
            consumer_key: env_string("NETSUITE_CONSUMER_KEY"),
            consumer_secret: env_string("NETSUITE_CONSUMER_SECRET"),
            token_key: env_string("NETSUITE_TOKEN_KEY"),
            token_secret: env_string("NETSUITE_TOKEN_SECRET"),
            base_url: env::var("NETSUITE_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            server_port: env_parse("PORT", defaults.server_port),
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            api_key: env_string("API_KEY"),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_ttl: env_parse("CACHE_TTL", defaults.cache_ttl),
            cleanup_interval: env_parse("CLEANUP_INTERVAL", defaults.cleanup_interval),
            request_timeout: env_parse("REQUEST_TIMEOUT", defaults.request_timeout),
            max_attempts: env_parse("MAX_ATTEMPTS", defaults.max_attempts),
            detail_concurrency: env_parse("DETAIL_CONCURRENCY", defaults.detail_concurrency),
        }
    }

    /// True when all five credential fields are non-empty.
    pub fn netsuite_configured(&self) -> bool {
        [
            &self.realm,
            &self.consumer_key,
            &self.consumer_secret,
            &self.token_key,
            &self.token_secret,
        ]
        .iter()
        .all(|v| !v.trim().is_empty())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            realm: String::new(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            token_key: String::new(),
            token_secret: String::new(),
            base_url: None,
            server_port: 8000,
            environment: "development".to_string(),
            api_key: String::new(),
            cache_max_entries: 1000,
            cache_ttl: 300,
            cleanup_interval: 1,
            request_timeout: 30,
            max_attempts: 3,
            detail_concurrency: 1,
        }
    }
}

fn env_string(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
