//! Upstream model server endpoint

use std::sync::Arc;
use std::time::Duration;

use nlp_serve_common::{Result, ServiceError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Default per-request timeout for upstream calls (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Upstream endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Prediction URL of the model server
    pub url: String,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Maximum in-flight requests to this model (1 = single-flight)
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: None,
            max_concurrent: None,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// A model server reachable over HTTP
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// concurrency limit.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    name: String,
    url: String,
    client: reqwest::Client,
    limiter: Option<Arc<Semaphore>>,
}

impl RemoteEndpoint {
    /// Create an endpoint; `name` tags errors and log lines
    pub fn new(name: impl Into<String>, config: &EndpointConfig) -> Result<Self> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::model(&name, format!("failed to create HTTP client: {e}")))?;

        let limiter = config
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

        Ok(Self {
            name,
            url: config.url.clone(),
            client,
            limiter,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// POST `body` as JSON and decode the response as `R`
    ///
    /// Transport failures, non-2xx statuses, `{"error": ...}` bodies and
    /// undecodable responses are all model errors for this endpoint.
    pub async fn post<B, R>(&self, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .acquire()
                    .await
                    .map_err(|e| self.error(format!("concurrency limiter closed: {e}")))?,
            ),
            None => None,
        };

        debug!("POST {} ({})", self.url, self.name);
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.error(format!("request failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.error(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!("{} returned HTTP {}", self.name, status);
            return Err(self.error(format!(
                "HTTP {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| self.error(format!("invalid JSON response: {e}")))?;

        if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
            return Err(self.error(format!("upstream error: {message}")));
        }

        serde_json::from_value(value)
            .map_err(|e| self.error(format!("unexpected response shape: {e}")))
    }

    fn error(&self, message: String) -> ServiceError {
        ServiceError::model(&self.name, message)
    }
}
