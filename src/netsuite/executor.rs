//! Request Executor Module
//!
//! Sends signed requests with a per-attempt timeout and bounded retries.
//!
//! Retry policy:
//! - 429: back off `2^attempt` seconds and retry while attempts remain
//! - timeout: same backoff; exhaustion yields [`ProxyError::RequestTimeout`]
//! - connection failure: same backoff; exhaustion yields [`ProxyError::RetriesExhausted`]
//! - other transport failure: returned immediately
//! - any other status >= 400: returned immediately with status and body
//!
//! Each retry is re-signed with a fresh timestamp and nonce.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::oauth::SignedRequest;
use crate::error::{ProxyError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

// == Sleeper ==
/// Waits between attempts. Swappable so tests can record delays instead of sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay before retrying after 1-indexed `attempt`: 2s, 4s, 8s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

// == Attempt Outcome ==
/// Failure of a single attempt, before the retry policy is applied.
#[derive(Debug)]
enum AttemptError {
    RateLimited(String),
    Status { status: u16, body: String },
    Timeout,
    Connection(String),
    Transport(String),
    Decode(String),
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AttemptError::Timeout;
        }
        let description = describe(&err);
        if err.is_connect() || description.to_lowercase().contains("connection") {
            AttemptError::Connection(description)
        } else {
            AttemptError::Transport(description)
        }
    }
}

/// Error message including its source chain.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

// == Request Executor ==
/// HTTP executor with timeout and retry semantics for NetSuite calls.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    max_attempts: u32,
    sleeper: Arc<dyn Sleeper>,
}

impl RequestExecutor {
    pub fn builder() -> RequestExecutorBuilder {
        RequestExecutorBuilder::default()
    }

    /// Executor with the default 30s timeout and 3 attempts.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Sends `request` (plus optional JSON body) using the configured attempt budget.
    pub async fn execute(&self, request: &SignedRequest, body: Option<&Value>) -> Result<Value> {
        self.execute_with_attempts(request, body, self.max_attempts)
            .await
    }

    /// Sends `request` with an explicit attempt budget (at least one attempt is made).
    pub async fn execute_with_attempts(
        &self,
        request: &SignedRequest,
        body: Option<&Value>,
        max_attempts: u32,
    ) -> Result<Value> {
        let attempts = max_attempts.max(1);
        let method = request.method();
        let url = request.url();

        for attempt in 1..=attempts {
            debug!(attempt, %method, url, "sending NetSuite request");

            let signed = if attempt == 1 {
                Cow::Borrowed(request)
            } else {
                Cow::Owned(request.resigned())
            };
            let err = match self.attempt(&signed, body).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match err {
                AttemptError::RateLimited(text) => {
                    if attempt < attempts {
                        let delay = backoff_delay(attempt);
                        warn!(attempt, delay_secs = delay.as_secs(), url, "rate limited, retrying");
                        self.sleeper.sleep(delay).await;
                        continue;
                    }
                    error!(attempts, url, "rate limited on final attempt");
                    return Err(ProxyError::RateLimited {
                        attempts,
                        body: text,
                    });
                }
                AttemptError::Status { status, body: text } => {
                    error!(status, url, body = %text, "NetSuite API error");
                    return Err(ProxyError::Upstream { status, body: text });
                }
                AttemptError::Timeout => {
                    if attempt < attempts {
                        let delay = backoff_delay(attempt);
                        warn!(attempt, delay_secs = delay.as_secs(), url, "request timeout, retrying");
                        self.sleeper.sleep(delay).await;
                        continue;
                    }
                    error!(attempts, url, "request timeout on final attempt");
                    return Err(ProxyError::RequestTimeout { attempts });
                }
                AttemptError::Connection(cause) => {
                    if attempt < attempts {
                        let delay = backoff_delay(attempt);
                        warn!(attempt, delay_secs = delay.as_secs(), url, error = %cause, "connection error, retrying");
                        self.sleeper.sleep(delay).await;
                        continue;
                    }
                    error!(attempts, url, error = %cause, "connection error on final attempt");
                    return Err(ProxyError::RetriesExhausted { attempts, cause });
                }
                AttemptError::Transport(cause) => {
                    error!(attempt, url, error = %cause, "transport error, not retrying");
                    return Err(ProxyError::Transport(cause));
                }
                AttemptError::Decode(cause) => {
                    error!(url, error = %cause, "could not decode NetSuite response");
                    return Err(ProxyError::InvalidResponse(cause));
                }
            }
        }

        Err(ProxyError::Transport(
            "request loop finished without a result".to_string(),
        ))
    }

    async fn attempt(
        &self,
        request: &SignedRequest,
        body: Option<&Value>,
    ) -> std::result::Result<Value, AttemptError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.full_url())
            .header(AUTHORIZATION, request.authorization())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%status, url = request.url(), "received NetSuite response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::RateLimited(body));
        }

        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| AttemptError::Decode(e.to_string()))
    }
}

// == Builder ==
/// Builder for [`RequestExecutor`].
pub struct RequestExecutorBuilder {
    timeout: Duration,
    max_attempts: u32,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RequestExecutorBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

impl RequestExecutorBuilder {
    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn build(self) -> Result<RequestExecutor> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProxyError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(RequestExecutor {
            client,
            max_attempts: self.max_attempts,
            sleeper: self.sleeper,
        })
    }
}
