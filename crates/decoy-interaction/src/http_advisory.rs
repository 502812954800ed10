//! HttpAdvisoryService - advisory decisions from a JSON endpoint.
//!
//! The endpoint receives the `AdvisoryRequest` as a JSON body and answers
//! with an `AdvisoryResponse`-shaped object.

use async_trait::async_trait;
use decoy_core::{AdvisoryRequest, AdvisoryResponse, AdvisoryService, DecoyError, Result};
use reqwest::Client;
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory service reached over plain HTTP.
#[derive(Clone)]
pub struct HttpAdvisoryService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpAdvisoryService {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Loads the endpoint from `DECOY_ADVISORY_URL` and an optional bearer
    /// token from `DECOY_ADVISORY_API_KEY`.
    pub fn try_from_env() -> Result<Self> {
        let endpoint = env::var("DECOY_ADVISORY_URL")
            .map_err(|_| DecoyError::config("DECOY_ADVISORY_URL is not set"))?;
        let api_key = env::var("DECOY_ADVISORY_API_KEY").ok();
        tracing::info!(
            "[HttpAdvisory] Initialized with URL: {}, API key: {}",
            endpoint,
            if api_key.is_some() { "present" } else { "none" }
        );
        Ok(Self::new(endpoint, api_key))
    }

    /// Per-request timeout applied by the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(api_key) = &self.api_key {
            request.header("Authorization", format!("Bearer {}", api_key))
        } else {
            request
        }
    }
}

#[async_trait]
impl AdvisoryService for HttpAdvisoryService {
    fn name(&self) -> &str {
        "http"
    }

    async fn recommend(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse> {
        let http_request = self.auth_request(
            self.client
                .post(&self.endpoint)
                .json(request)
                .timeout(self.timeout),
        );

        let response = http_request
            .send()
            .await
            .map_err(|e| DecoyError::advisory(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DecoyError::advisory(format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(DecoyError::advisory(format!(
                "endpoint returned {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        tracing::debug!(
            "[HttpAdvisory] {} answered for session {} ({} bytes)",
            self.endpoint,
            request.session_id,
            body.len()
        );
        AdvisoryResponse::parse_lenient(&body)
    }
}
