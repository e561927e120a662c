//! Conversation state core
//!
//! Owns the transcript, the in-flight lock and the dashboard view model.
//! Turn logic is a pure transition function over [`TurnState`]; the
//! [`SessionController`] applies its effects and performs the one
//! suspending step, the transport call.

mod controller;
mod effect;
mod event;
pub mod reconcile;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use controller::{SessionController, SessionEvent, SessionOptions, TurnOutcome, WELCOME_MESSAGE};
pub use effect::Effect;
pub use event::Event;
pub use reconcile::{assistant_reply, normalize, INSUFFICIENT_INFORMATION_REPLY};
pub use state::{
    DashboardState, DiagnosisCandidate, FollowUpQuestion, Message, Role, Session, TurnState,
};
pub use transition::{transition, TransitionError, TransitionResult, CONNECTIVITY_NOTICE};
