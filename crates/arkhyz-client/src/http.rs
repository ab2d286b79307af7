use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, warn};

use arkhyz_types::Envelope;
use arkhyz_types::api::{IDEMPOTENCY_KEY_HEADER, Submission};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Server is unavailable. Make sure the backend is running")]
    Unreachable,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Server returned a non-JSON response: {0}")]
    NotJson(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ClientError::Unreachable
        } else {
            ClientError::Connection(e.to_string())
        }
    }
}

/// Talks to the lead-capture backend.
#[derive(Debug, Clone)]
pub struct LeadClient {
    http: reqwest::Client,
    base_url: String,
}

impl LeadClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a validated submission and return the id the server assigned.
    pub async fn submit(
        &self,
        submission: &Submission,
        idempotency_key: Option<&str>,
    ) -> Result<i64, ClientError> {
        let mut request = self
            .http
            .post(format!("{}/api/submit-form", self.base_url))
            .json(submission);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        if !is_json {
            let body = response.text().await.unwrap_or_default();
            warn!("Non-JSON reply from {} ({})", self.base_url, status);
            return Err(ClientError::NotJson(body.chars().take(100).collect()));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| ClientError::NotJson(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| format!("Server error: {status}")),
            ));
        }
        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| "Failed to send data".to_string()),
            ));
        }

        let id = envelope
            .id
            .ok_or_else(|| ClientError::Rejected("Server response is missing the record id".into()))?;
        debug!("Submission stored as #{}", id);
        Ok(id)
    }

    /// Whether `/ping` answers at all. Never fails.
    pub async fn check_availability(&self) -> bool {
        let result = self
            .http
            .get(format!("{}/ping", self.base_url))
            .timeout(PING_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Backend ping failed: {}", e);
                false
            }
        }
    }
}
