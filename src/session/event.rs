//! Events that drive a turn

use crate::api::ChatResponse;
use crate::transport::TransportError;

/// Events that trigger turn transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Free text from the user
    Submit { text: String },

    /// The backend answered; fields may be missing
    ResponseReceived { response: ChatResponse },

    /// Any transport-level failure, timeouts included
    TransportFailed { error: TransportError },
}
