//! Request/response transport to the diagnostic backend
//!
//! The session core only ever sees this trait; timeouts, connection
//! handling and status mapping all live behind it.

mod error;
mod http;

#[cfg(test)]
pub mod testing;

pub use error::{classify_status, TransportError, TransportErrorKind};
pub use http::HttpTransport;

use crate::api::{ChatRequest, ChatResponse, FeedbackRequest, HealthStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Client for the diagnostic backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run one diagnostic turn
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;

    /// Submit clinician feedback; the body of the reply is ignored
    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), TransportError>;

    /// Probe backend liveness
    async fn check_health(&self) -> Result<HealthStatus, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        (**self).send_chat(request).await
    }

    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), TransportError> {
        (**self).send_feedback(request).await
    }

    async fn check_health(&self) -> Result<HealthStatus, TransportError> {
        (**self).check_health().await
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: Transport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    fn log_failure(operation: &'static str, duration_ms: u128, e: &TransportError) {
        if e.kind == TransportErrorKind::Timeout {
            tracing::error!(
                operation,
                duration_ms = %duration_ms,
                error = %e.message,
                "Request timed out, the diagnostic service may be busy with serial reasoning"
            );
        } else {
            tracing::error!(
                operation,
                duration_ms = %duration_ms,
                error = %e.message,
                kind = e.kind.as_str(),
                retryable = e.kind.is_retryable(),
                "Backend request failed"
            );
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.send_chat(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(response) => {
                tracing::info!(
                    session_id = %request.session_id,
                    duration_ms = %duration_ms,
                    response_type = response.response_type.as_deref().unwrap_or("<missing>"),
                    candidates = response.diagnosis_list.as_ref().map_or(0, Vec::len),
                    "Chat turn completed"
                );
            }
            Err(e) => Self::log_failure("chat", duration_ms, e),
        }

        result
    }

    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), TransportError> {
        let start = Instant::now();
        let result = self.inner.send_feedback(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(()) => {
                tracing::info!(
                    session_id = %request.session_id,
                    action = ?request.action,
                    duration_ms = %duration_ms,
                    "Feedback delivered"
                );
            }
            Err(e) => Self::log_failure("feedback", duration_ms, e),
        }

        result
    }

    async fn check_health(&self) -> Result<HealthStatus, TransportError> {
        let start = Instant::now();
        let result = self.inner.check_health().await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(health) => {
                tracing::debug!(status = %health.status, duration_ms = %duration_ms, "Health probe");
            }
            Err(e) => Self::log_failure("health", duration_ms, e),
        }

        result
    }
}
