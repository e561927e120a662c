//! HTTP transport backed by reqwest

use super::error::classify_status;
use super::{Transport, TransportError};
use crate::api::{ChatRequest, ChatResponse, FeedbackRequest, HealthStatus};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// JSON-over-HTTP client for the diagnostic backend
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    /// Use a preconfigured client (proxies, TLS roots, default headers)
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Turn a non-success status into a classified error, keeping the body
    async fn check_status(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        tracing::debug!(session_id = %request.session_id, "POST /chat");
        let response = self
            .client
            .post(self.url("chat"))
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json::<ChatResponse>().await?)
    }

    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), TransportError> {
        tracing::debug!(session_id = %request.session_id, "POST /feedback");
        let response = self
            .client
            .post(self.url("feedback"))
            .json(request)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_health(&self) -> Result<HealthStatus, TransportError> {
        let response = self.client.get(self.url("health")).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json::<HealthStatus>().await?)
    }
}
