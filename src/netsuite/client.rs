//! NetSuite Client Module
//!
//! Record listing with optional detail expansion, single-record and sublist
//! reads, and SuiteQL execution. Every call is signed and sent through
//! [`RequestExecutor`].

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::executor::RequestExecutor;
use super::oauth::{percent_encode, Credential, SignedRequest};
use super::params::Params;
use crate::config::Config;
use crate::error::{ProxyError, Result};

/// Page size used when the caller does not choose one.
pub const DEFAULT_LIMIT: u32 = 1000;

// == Fetch Result ==
/// List-shaped result shared by record listing and SuiteQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    /// Entity type for record listings, absent for SuiteQL
    #[serde(rename = "entity", default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub count: u64,
    pub has_more: bool,
    /// Summary records, or fully expanded records when expansion was requested
    pub items: Vec<Value>,
    pub offset: u32,
    pub limit: u32,
    pub total_results: u64,
}

/// Upstream list envelope; every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    has_more: bool,
    total_results: Option<u64>,
}

impl Envelope {
    fn decode(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ProxyError::InvalidResponse(e.to_string()))
    }

    fn into_result(self, entity_name: Option<String>, limit: u32, offset: u32) -> FetchResult {
        FetchResult {
            entity_name,
            count: self.count,
            has_more: self.has_more,
            items: self.items,
            offset,
            limit,
            total_results: self.total_results.unwrap_or(self.count),
        }
    }
}

// == Sublist ==
/// Sublist of a record (e.g. the `item` lines of a sales order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sublist {
    #[serde(default)]
    pub items: Vec<Value>,
    /// Anything else the upstream returned alongside the items
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// == Fetched ==
/// Result of a best-effort read: either the real value or a fallback with the
/// error that forced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Complete(T),
    Degraded { fallback: T, cause: ProxyError },
}

impl<T> Fetched<T> {
    pub fn value(&self) -> &T {
        match self {
            Fetched::Complete(value) => value,
            Fetched::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetched::Complete(value) => value,
            Fetched::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded { .. })
    }

    pub fn cause(&self) -> Option<&ProxyError> {
        match self {
            Fetched::Complete(_) => None,
            Fetched::Degraded { cause, .. } => Some(cause),
        }
    }
}

// == List Query ==
/// Query options for a record listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
    /// Record filter expression
    pub q: Option<String>,
    pub fields: Option<String>,
    pub expand_subresources: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            q: None,
            fields: None,
            expand_subresources: None,
        }
    }
}

impl ListQuery {
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    /// Parameters sent (and signed) with the list request. Empty options are left out.
    pub fn params(&self) -> Params {
        let mut params = Params::new()
            .with("limit", self.limit.to_string())
            .with("offset", self.offset.to_string());

        let optional = [
            ("q", &self.q),
            ("fields", &self.fields),
            ("expandSubresources", &self.expand_subresources),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.insert(name, value);
            }
        }
        params
    }
}

// == Endpoints ==
/// URL layout of the NetSuite REST services for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    rest_root: String,
}

impl Endpoints {
    /// `https://{account}.suitetalk.api.netsuite.com/services/rest`, where the
    /// account host is the realm lowercased with `_` replaced by `-`.
    pub fn for_realm(realm: &str) -> Self {
        let account = realm.to_lowercase().replace('_', "-");
        Self::with_base_url(format!(
            "https://{}.suitetalk.api.netsuite.com/services/rest",
            account
        ))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            rest_root: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn records(&self, entity: &str) -> String {
        format!("{}/record/v1/{}", self.rest_root, percent_encode(entity))
    }

    pub fn record(&self, entity: &str, id: &str) -> String {
        format!("{}/{}", self.records(entity), percent_encode(id))
    }

    pub fn sublist(&self, entity: &str, id: &str, sublist: &str) -> String {
        format!("{}/{}", self.record(entity, id), percent_encode(sublist))
    }

    pub fn suiteql(&self) -> String {
        format!("{}/query/v1/suiteql", self.rest_root)
    }
}

// == NetSuite Client ==
/// Signed NetSuite REST client. Built once and shared by reference.
#[derive(Clone)]
pub struct NetSuiteClient {
    credential: Credential,
    endpoints: Endpoints,
    executor: RequestExecutor,
    detail_concurrency: usize,
}

impl NetSuiteClient {
    /// Client for the credential's realm, fetching details one at a time.
    pub fn new(credential: Credential, executor: RequestExecutor) -> Self {
        let endpoints = Endpoints::for_realm(credential.realm());
        info!(realm = credential.realm(), "NetSuite client initialized");
        Self {
            credential,
            endpoints,
            executor,
            detail_concurrency: 1,
        }
    }

    /// Builds credential, executor and endpoints from configuration.
    ///
    /// Fails with [`ProxyError::Configuration`] if any credential is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credential = Credential::from_config(config)?;
        let executor = RequestExecutor::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .max_attempts(config.max_attempts)
            .build()?;

        let mut client =
            Self::new(credential, executor).with_detail_concurrency(config.detail_concurrency);
        if let Some(base_url) = &config.base_url {
            client = client.with_endpoints(Endpoints::with_base_url(base_url.as_str()));
        }
        Ok(client)
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Detail fetches allowed in flight during expansion (minimum 1).
    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency.max(1);
        self
    }

    pub fn realm(&self) -> &str {
        self.credential.realm()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // == List Records ==
    /// Lists records of `entity`. With `expand_details`, every summary item is
    /// replaced by its full record; items whose detail fetch fails keep their
    /// summary form and the listing still succeeds.
    pub async fn list_records(
        &self,
        entity: &str,
        query: &ListQuery,
        expand_details: bool,
    ) -> Result<FetchResult> {
        let request = SignedRequest::new(
            Method::GET,
            self.endpoints.records(entity),
            query.params(),
            &self.credential,
        );
        let envelope = Envelope::decode(self.executor.execute(&request, None).await?)?;
        let mut result = envelope.into_result(Some(entity.to_string()), query.limit, query.offset);

        if expand_details && !result.items.is_empty() {
            let total = result.items.len();
            info!(entity, total, "fetching details for records");

            let summaries = std::mem::take(&mut result.items);
            let outcomes: Vec<Fetched<Value>> = stream::iter(summaries)
                .map(|item| self.expand_item(entity, item))
                .buffered(self.detail_concurrency)
                .collect()
                .await;

            let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
            if degraded > 0 {
                warn!(entity, degraded, total, "some records kept their summary form");
            }
            result.items = outcomes.into_iter().map(Fetched::into_inner).collect();
        }

        Ok(result)
    }

    async fn expand_item(&self, entity: &str, item: Value) -> Fetched<Value> {
        let Some(id) = record_id(&item) else {
            return Fetched::Complete(item);
        };

        match self.get_record(entity, &id).await {
            Ok(record) => Fetched::Complete(record),
            Err(cause) => {
                warn!(entity, id = %id, error = %cause, "failed to fetch record details");
                Fetched::Degraded {
                    fallback: item,
                    cause,
                }
            }
        }
    }

    // == Get Record ==
    /// Fetches one full record. Errors propagate unchanged.
    pub async fn get_record(&self, entity: &str, id: &str) -> Result<Value> {
        let request = SignedRequest::new(
            Method::GET,
            self.endpoints.record(entity, id),
            Params::new(),
            &self.credential,
        );
        self.executor.execute(&request, None).await
    }

    // == Get Sublist ==
    /// Fetches a record sublist. Sublists are optional detail: any failure
    /// yields an empty list marked as degraded.
    pub async fn get_sublist(&self, entity: &str, id: &str, sublist: &str) -> Fetched<Sublist> {
        let request = SignedRequest::new(
            Method::GET,
            self.endpoints.sublist(entity, id, sublist),
            Params::new(),
            &self.credential,
        );

        let outcome = match self.executor.execute(&request, None).await {
            Ok(Value::Null) => Ok(Sublist::default()),
            Ok(value) => serde_json::from_value::<Sublist>(value)
                .map_err(|e| ProxyError::InvalidResponse(e.to_string())),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(list) => Fetched::Complete(list),
            Err(cause) => {
                warn!(entity, id, sublist, error = %cause, "failed to fetch sublist");
                Fetched::Degraded {
                    fallback: Sublist::default(),
                    cause,
                }
            }
        }
    }

    // == Execute Query ==
    /// Runs a SuiteQL query. `limit` and `offset` go into both the URL and the
    /// signed parameter set.
    pub async fn execute_query(&self, query: &str, limit: u32, offset: u32) -> Result<FetchResult> {
        let params = Params::new()
            .with("limit", limit.to_string())
            .with("offset", offset.to_string());
        let request = SignedRequest::new(
            Method::POST,
            self.endpoints.suiteql(),
            params,
            &self.credential,
        );
        let body = json!({ "q": query });

        let envelope = Envelope::decode(self.executor.execute(&request, Some(&body)).await?)?;
        Ok(envelope.into_result(None, limit, offset))
    }
}

/// Record id of a summary item; NetSuite sends strings but numbers are accepted.
fn record_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
