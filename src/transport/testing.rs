//! Mock transports for testing
//!
//! These mocks let the session core be exercised without a backend.

use super::{Transport, TransportError};
use crate::api::{ChatRequest, ChatResponse, FeedbackRequest, HealthStatus};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued chat results
#[allow(dead_code)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ChatResponse, TransportError>>>,
    /// Record of all chat requests made
    pub requests: Mutex<Vec<ChatRequest>>,
    /// Record of all feedback submitted
    pub feedback: Mutex<Vec<FeedbackRequest>>,
    health: Mutex<Option<Result<HealthStatus, TransportError>>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
            health: Mutex::new(None),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: ChatResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a transport failure
    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn set_health(&self, health: Result<HealthStatus, TransportError>) {
        *self.health.lock().unwrap() = Some(health);
    }

    /// Get recorded chat requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get recorded feedback
    pub fn recorded_feedback(&self) -> Vec<FeedbackRequest> {
        self.feedback.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<ChatResponse, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }

    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), TransportError> {
        self.feedback.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn check_health(&self) -> Result<HealthStatus, TransportError> {
        self.health.lock().unwrap().clone().unwrap_or_else(|| {
            Ok(HealthStatus {
                status: "ok".to_string(),
                ..HealthStatus::default()
            })
        })
    }
}

// ============================================================================
// Gated Mock Transport (holds a turn in flight)
// ============================================================================

/// Mock transport whose chat calls block until the test releases them
pub struct GatedMockTransport {
    inner: MockTransport,
    /// Notified when a chat request arrives
    pub request_started: Arc<Notify>,
    /// Notify once per request to let it complete
    pub release: Arc<Notify>,
}

#[allow(dead_code)]
impl GatedMockTransport {
    pub fn new() -> Self {
        Self {
            inner: MockTransport::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: ChatResponse) {
        self.inner.queue_response(response);
    }

    pub fn queue_error(&self, error: TransportError) {
        self.inner.queue_error(error);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.inner.recorded_requests()
    }
}

impl Default for GatedMockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for GatedMockTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next_response()
    }

    async fn send_feedback(&self, request: &FeedbackRequest) -> Result<(), TransportError> {
        self.inner.send_feedback(request).await
    }

    async fn check_health(&self) -> Result<HealthStatus, TransportError> {
        self.inner.check_health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            session_id: "s".to_string(),
            patient_id: String::new(),
            user_input: "hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_transport_queue() {
        let mock = MockTransport::new();
        mock.queue_response(ChatResponse::default());

        assert!(mock.send_chat(&request()).await.is_ok());
        // Second call should fail (nothing queued)
        assert!(mock.send_chat(&request()).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_gated_transport_waits_for_release() {
        let mock = Arc::new(GatedMockTransport::new());
        mock.queue_response(ChatResponse::default());

        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.send_chat(&request()).await })
        };

        mock.request_started.notified().await;
        assert!(!task.is_finished());
        mock.release.notify_one();
        assert!(task.await.unwrap().is_ok());
    }
}
