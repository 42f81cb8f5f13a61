//! Request DTOs for the proxy API
//!
//! Defines incoming query strings and bodies.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::cache::MAX_KEY_LENGTH;
use crate::netsuite::client::{ListQuery, DEFAULT_LIMIT};

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_expand() -> bool {
    true
}

/// Query string of `GET /api/netsuite/:entity`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    /// Record filter expression
    pub q: Option<String>,
    /// Comma-separated field list
    pub fields: Option<String>,
    pub expand_subresources: Option<String>,
    /// Replace summaries with full records
    #[serde(default = "default_expand")]
    pub expand: bool,
    /// Skip the cache lookup
    #[serde(default, rename = "no_cache")]
    pub no_cache: bool,
}

impl Default for ListRecordsParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            q: None,
            fields: None,
            expand_subresources: None,
            expand: true,
            no_cache: false,
        }
    }
}

impl ListRecordsParams {
    /// Cache key: `netsuite:{entity}:{limit}:{offset}:{q}:{fields}:{expandSubresources}:{expand}`.
    ///
    /// Keys that would exceed the cache's key limit (long filters) are
    /// replaced by `netsuite:sha256:{hex digest}` of the full key.
    pub fn cache_key(&self, entity: &str) -> String {
        let key = format!(
            "netsuite:{}:{}:{}:{}:{}:{}:{}",
            entity,
            self.limit,
            self.offset,
            self.q.as_deref().unwrap_or(""),
            self.fields.as_deref().unwrap_or(""),
            self.expand_subresources.as_deref().unwrap_or(""),
            self.expand
        );
        if key.len() <= MAX_KEY_LENGTH {
            return key;
        }
        format!("netsuite:sha256:{}", hex::encode(Sha256::digest(key.as_bytes())))
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            limit: self.limit,
            offset: self.offset,
            q: self.q.clone(),
            fields: self.fields.clone(),
            expand_subresources: self.expand_subresources.clone(),
        }
    }
}

/// Body of `POST /api/netsuite/:entity/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// SuiteQL text
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl QueryRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.query.trim().is_empty() {
            return Some("Query is required".to_string());
        }
        None
    }
}

/// Returns an error message unless `entity` is at least two characters of `[A-Za-z0-9_]`.
pub fn validate_entity(entity: &str) -> Option<String> {
    if entity.len() < 2 {
        return Some("Invalid entity name".to_string());
    }
    if !entity
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Some(format!("Invalid entity name: {}", entity));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params: ListRecordsParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 1000);
        assert_eq!(params.offset, 0);
        assert!(params.expand);
        assert!(!params.no_cache);
    }

    #[test]
    fn test_list_params_field_names() {
        let json = r#"{"limit": 5, "expandSubresources": "true", "expand": false, "no_cache": true}"#;
        let params: ListRecordsParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit, 5);
        assert_eq!(params.expand_subresources.as_deref(), Some("true"));
        assert!(!params.expand);
        assert!(params.no_cache);
    }

    #[test]
    fn test_cache_key_layout() {
        let params = ListRecordsParams {
            limit: 2,
            q: Some("x".to_string()),
            ..ListRecordsParams::default()
        };
        assert_eq!(params.cache_key("customer"), "netsuite:customer:2:0:x:::true");
    }

    #[test]
    fn test_cache_key_separates_expand_subresources() {
        let plain = ListRecordsParams::default();
        let sub = ListRecordsParams {
            expand_subresources: Some("true".to_string()),
            ..ListRecordsParams::default()
        };
        assert_eq!(sub.cache_key("customer"), "netsuite:customer:1000:0:::true:true");
        assert_ne!(plain.cache_key("customer"), sub.cache_key("customer"));
    }

    #[test]
    fn test_long_filter_key_is_hashed() {
        let long = |q: &str| ListRecordsParams {
            q: Some(q.repeat(300)),
            ..ListRecordsParams::default()
        };
        let a = long("a").cache_key("customer");
        let b = long("b").cache_key("customer");

        assert!(a.starts_with("netsuite:sha256:"));
        assert!(a.len() <= MAX_KEY_LENGTH);
        assert_ne!(a, b);
        assert_eq!(a, long("a").cache_key("customer"));
    }

    #[test]
    fn test_query_request_validation() {
        let req: QueryRequest = serde_json::from_str(r#"{"query": "SELECT 1"}"#).unwrap();
        assert!(req.validate().is_none());
        assert_eq!(req.limit, 1000);

        let blank: QueryRequest = serde_json::from_str(r#"{"query": "  "}"#).unwrap();
        assert!(blank.validate().is_some());
    }

    #[test]
    fn test_validate_entity() {
        assert!(validate_entity("customer").is_none());
        assert!(validate_entity("customrecord_x1").is_none());
        assert!(validate_entity("c").is_some());
        assert!(validate_entity("../etc").is_some());
    }
}
