//! SCBR console - session client for the SCBR clinical decision support
//! backend
//!
//! Turns free-text patient descriptions into diagnostic turns and keeps a
//! transcript plus an always-renderable dashboard in step with the
//! backend's answers.

pub mod api;
pub mod config;
pub mod format;
pub mod patient;
pub mod session;
pub mod session_id;
pub mod transport;

pub use config::ClientConfig;
pub use patient::PatientContext;
pub use session::{DashboardState, Message, Role, Session, SessionController, SessionOptions};
pub use session_id::SessionId;
pub use transport::{HttpTransport, LoggingTransport, Transport, TransportError};
