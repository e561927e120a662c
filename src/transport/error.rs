//! Transport error types

use thiserror::Error;

/// Transport error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }
}

/// Error classification.
///
/// The session core treats every kind the same way; the split exists for
/// logs and for callers that want to offer a retry button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS, reset - retryable
    Network,
    /// Request exceeded the client timeout - retryable
    Timeout,
    /// Server error (5xx) - retryable
    ServerError,
    /// Rate limited (429) - retryable
    RateLimit,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (4xx) or rejected before sending
    InvalidRequest,
    /// Body was not the expected JSON
    Decode,
    Unknown,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::ServerError | Self::RateLimit
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::ServerError => "server_error",
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::InvalidRequest => "invalid_request",
            Self::Decode => "decode",
            Self::Unknown => "unknown",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timed out: {e}"))
        } else if e.is_decode() {
            Self::decode(format!("Malformed response body: {e}"))
        } else if e.is_connect() || e.is_request() {
            Self::network(format!("Network error: {e}"))
        } else if let Some(status) = e.status() {
            classify_status(status.as_u16(), &e.to_string())
        } else {
            Self::unknown(e.to_string())
        }
    }
}

/// Map a non-success HTTP status to an error
pub fn classify_status(status: u16, body: &str) -> TransportError {
    match status {
        401 | 403 => TransportError::auth(format!("Authentication failed: {body}")),
        429 => TransportError::rate_limit(format!("Rate limited: {body}")),
        408 | 504 => TransportError::timeout(format!("Backend timed out ({status}): {body}")),
        500..=599 => TransportError::server_error(format!("Server error ({status}): {body}")),
        400..=499 => TransportError::invalid_request(format!("Bad request ({status}): {body}")),
        _ => TransportError::unknown(format!("Unexpected status {status}: {body}")),
    }
}
