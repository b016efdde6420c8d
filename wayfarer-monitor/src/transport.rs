//! Delivery of reports to the ingest endpoints
//!
//! Delivery is fire-and-forget: a [`DeliveryResult`] is logged by the
//! monitor and never retried.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint answered with status {0}")]
    Status(u16),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

pub type DeliveryResult = Result<(), TransportError>;

#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// POST `body` as JSON to `endpoint`
    async fn send(&self, endpoint: &str, body: &Value) -> DeliveryResult;
}

/// reqwest-backed transport. Relative endpoints are resolved against
/// `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        // No request timeout
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ReportTransport for HttpTransport {
    async fn send(&self, endpoint: &str, body: &Value) -> DeliveryResult {
        let response = self.client.post(self.url(endpoint)).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}

/// Records every delivery instead of sending it
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Value)>>,
    fail: Mutex<bool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (they are still recorded)
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl ReportTransport for RecordingTransport {
    async fn send(&self, endpoint: &str, body: &Value) -> DeliveryResult {
        self.sent.lock().push((endpoint.to_string(), body.clone()));
        if *self.fail.lock() {
            Err(TransportError::Unavailable("network down".to_string()))
        } else {
            Ok(())
        }
    }
}
