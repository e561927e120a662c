//! Pure turn transition function
//!
//! Two states, `Idle` and `Submitting`. A turn is accepted only from `Idle`
//! and always settles back to `Idle`, with or without an answer.

use super::reconcile::{assistant_reply, normalize};
use super::state::TurnState;
use super::{Effect, Event};
use thiserror::Error;

/// System notice appended when a turn fails for any transport reason
pub const CONNECTIVITY_NOTICE: &str =
    "Connection error or the diagnostic service is busy. Please try again later.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons a transition is refused.
///
/// None of these are faults: the controller drops the event and leaves the
/// session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("A turn is already in flight")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O.
pub fn transition(state: TurnState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + Submit -> Submitting
        (TurnState::Idle, Event::Submit { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            // The rest of the dashboard stays until the answer arrives
            Ok(TransitionResult::new(TurnState::Submitting)
                .with_effect(Effect::user_message(text.clone()))
                .with_effect(Effect::ClearSafetyWarning)
                .with_effect(Effect::NotifyChanged)
                .with_effect(Effect::RequestTurn { text }))
        }

        // At most one outstanding turn
        (TurnState::Submitting, Event::Submit { .. }) => Err(TransitionError::Busy),

        // Submitting + ResponseReceived -> Idle, dashboard replaced
        (TurnState::Submitting, Event::ResponseReceived { response }) => {
            let dashboard = normalize(response);
            let reply = assistant_reply(&dashboard);
            Ok(TransitionResult::new(TurnState::Idle)
                .with_effect(Effect::apply_dashboard(dashboard))
                .with_effect(Effect::assistant_message(reply))
                .with_effect(Effect::NotifyChanged))
        }

        // Submitting + TransportFailed -> Idle, dashboard left as it was
        (TurnState::Submitting, Event::TransportFailed { .. }) => {
            Ok(TransitionResult::new(TurnState::Idle)
                .with_effect(Effect::system_message(CONNECTIVITY_NOTICE))
                .with_effect(Effect::NotifyChanged))
        }

        (TurnState::Idle, event @ (Event::ResponseReceived { .. } | Event::TransportFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "No turn in flight for {event:?}"
            )))
        }
    }
}
