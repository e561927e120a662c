//! Session controller
//!
//! Owns the [`Session`] aggregate and the patient selection, runs turns
//! against a [`Transport`], and broadcasts a change signal after every
//! applied transition.
//!
//! The session mutex is only ever held for synchronous check-and-apply
//! sections, never across the transport call, so the `Idle -> Submitting`
//! check and flip is atomic even on a multi-threaded runtime.

use super::state::{Message, Role, Session, TurnState};
use super::transition::{transition, TransitionError};
use super::{Effect, Event};
use crate::api::{ChatRequest, FeedbackAction, FeedbackRequest, HealthStatus};
use crate::config::ClientConfig;
use crate::patient::PatientContext;
use crate::session_id::SessionId;
use crate::transport::{Transport, TransportError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Greeting and disclaimer seeded into new sessions when enabled
pub const WELCOME_MESSAGE: &str = "Hello, I am the Agentic SCBR-CDSS assistant. Please \
describe the patient's chief complaint and symptoms in detail, and I will help with the \
diagnostic analysis.\n\n**Disclaimer:** This is an academic research decision-support \
system. AI output may contain errors or hallucinations. All medical decisions must be \
confirmed by a qualified TCM physician. This system accepts no medical liability.";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Session policy knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Seed every new session with [`WELCOME_MESSAGE`]
    pub welcome_message: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            welcome_message: true,
        }
    }
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            welcome_message: config.welcome_message,
        }
    }
}

/// Change signal for observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Transcript, lock or dashboard changed
    Changed {
        session_id: SessionId,
        processing: bool,
        message_count: usize,
    },
    /// The whole session was replaced
    Reset { session_id: SessionId },
}

/// What happened to one `submit` call. Informational; the session itself is
/// the source of truth.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Not accepted: blank input or a turn already in flight
    Ignored(TransitionError),
    /// The backend answered and the dashboard was replaced
    Answered,
    /// The transport failed; a system notice was appended
    Failed(TransportError),
    /// The session was reset while the turn was in flight
    Discarded,
}

/// Owner of one conversation with the diagnostic backend
pub struct SessionController<T: Transport> {
    transport: T,
    options: SessionOptions,
    session: Mutex<Session>,
    patient: Mutex<PatientContext>,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl<T: Transport> SessionController<T> {
    pub fn new(transport: T, options: SessionOptions) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session = fresh_session(options);
        tracing::info!(session_id = %session.session_id(), "Session started");
        Self {
            transport,
            options,
            session: Mutex::new(session),
            patient: Mutex::new(PatientContext::new()),
            events_tx,
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Subscribe to change signals
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Copy of the current session for rendering
    pub fn snapshot(&self) -> Session {
        lock(&self.session).clone()
    }

    pub fn session_id(&self) -> SessionId {
        lock(&self.session).session_id().clone()
    }

    pub fn is_processing(&self) -> bool {
        lock(&self.session).is_processing()
    }

    // ==================== Turns ====================

    /// Run one turn.
    ///
    /// Blank input and calls made while a turn is in flight are dropped
    /// without touching the session. An accepted turn always appends the
    /// user message, then exactly one assistant or system message, and
    /// always releases the lock, including when this future is dropped
    /// before the transport answers.
    pub async fn submit(&self, text: &str) -> TurnOutcome {
        let (session_id, request) = match self.begin_turn(text) {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::debug!(reason = %e, "Submission ignored");
                return TurnOutcome::Ignored(e);
            }
        };

        let guard = TurnGuard {
            session: &self.session,
            events_tx: &self.events_tx,
            session_id,
            armed: true,
        };

        let event = match self.transport.send_chat(&request).await {
            Ok(response) => Event::ResponseReceived { response },
            Err(error) => {
                tracing::warn!(
                    session_id = %request.session_id,
                    error = %error,
                    kind = error.kind.as_str(),
                    "Turn failed"
                );
                Event::TransportFailed { error }
            }
        };

        guard.settle(event)
    }

    /// Check and flip the lock, append the user message, build the request
    fn begin_turn(&self, text: &str) -> Result<(SessionId, ChatRequest), TransitionError> {
        let patient_id = lock(&self.patient).reference().to_string();

        let mut session = lock(&self.session);
        let result = transition(
            session.turn(),
            Event::Submit {
                text: text.to_string(),
            },
        )?;
        session.set_turn(result.new_state);
        let user_input = apply_effects(&mut session, &self.events_tx, result.effects)
            .unwrap_or_else(|| text.to_string());

        let session_id = session.session_id().clone();
        tracing::info!(
            session_id = %session_id,
            has_patient = !patient_id.is_empty(),
            chars = user_input.chars().count(),
            "Turn submitted"
        );

        let request = ChatRequest {
            session_id: session_id.to_string(),
            patient_id,
            user_input,
        };
        Ok((session_id, request))
    }

    // ==================== Session lifecycle ====================

    /// Replace the whole session: new id, empty transcript (or just the
    /// welcome message), default dashboard, not processing.
    ///
    /// A turn still in flight keeps running, but its result is discarded
    /// when it settles because its session no longer exists.
    pub fn reset_session(&self) -> SessionId {
        let fresh = fresh_session(self.options);
        let session_id = fresh.session_id().clone();
        let previous = std::mem::replace(&mut *lock(&self.session), fresh);

        if previous.is_processing() {
            tracing::info!(
                session_id = %previous.session_id(),
                "Session reset with a turn in flight; its result will be discarded"
            );
        }
        tracing::info!(
            previous = %previous.session_id(),
            session_id = %session_id,
            "Session reset"
        );

        let _ = self.events_tx.send(SessionEvent::Reset {
            session_id: session_id.clone(),
        });
        session_id
    }

    /// Append a message directly, e.g. for externally triggered notices
    pub fn add_message(&self, role: Role, content: impl Into<String>) -> Message {
        let mut session = lock(&self.session);
        let message = session.push_message(role, content).clone();
        notify_changed(&session, &self.events_tx);
        message
    }

    // ==================== Patient context ====================

    /// Select the patient later turns refer to. The conversation is kept.
    pub fn set_patient(&self, id: &str) {
        lock(&self.patient).set(id);
    }

    pub fn clear_patient(&self) {
        lock(&self.patient).clear();
    }

    pub fn patient(&self) -> PatientContext {
        lock(&self.patient).clone()
    }

    // ==================== Side channels ====================

    /// Send clinician feedback for the current session.
    ///
    /// Fire-and-forget from the session's point of view: nothing here
    /// touches transcript or dashboard. `MODIFY` needs non-blank content
    /// and is refused before any I/O otherwise.
    pub async fn send_feedback(
        &self,
        action: FeedbackAction,
        modified_content: Option<String>,
    ) -> Result<(), TransportError> {
        let modified_content = modified_content.filter(|c| !c.trim().is_empty());
        if action == FeedbackAction::Modify && modified_content.is_none() {
            return Err(TransportError::invalid_request(
                "MODIFY feedback requires the corrected content",
            ));
        }

        let request = FeedbackRequest {
            session_id: self.session_id().to_string(),
            patient_id: lock(&self.patient).reference().to_string(),
            action,
            modified_content,
        };
        self.transport.send_feedback(&request).await
    }

    pub async fn check_health(&self) -> Result<HealthStatus, TransportError> {
        self.transport.check_health().await
    }
}

/// Settles a turn exactly once, on the normal path or on drop
struct TurnGuard<'a> {
    session: &'a Mutex<Session>,
    events_tx: &'a broadcast::Sender<SessionEvent>,
    session_id: SessionId,
    armed: bool,
}

impl TurnGuard<'_> {
    fn settle(self, event: Event) -> TurnOutcome {
        self.settle_with(|session, events_tx, session_id| {
            settle_turn(session, events_tx, session_id, event)
        })
    }

    /// Disarms only once `apply` has returned; a panic inside it still
    /// releases the lock through `Drop`.
    fn settle_with<F>(mut self, apply: F) -> TurnOutcome
    where
        F: FnOnce(&mut Session, &broadcast::Sender<SessionEvent>, &SessionId) -> TurnOutcome,
    {
        let outcome = apply(&mut lock(self.session), self.events_tx, &self.session_id);
        self.armed = false;
        outcome
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(session_id = %self.session_id, "Turn dropped before it settled");
        settle_turn(
            &mut lock(self.session),
            self.events_tx,
            &self.session_id,
            Event::TransportFailed {
                error: TransportError::unknown("Turn abandoned before the backend answered"),
            },
        );
    }
}

fn settle_turn(
    session: &mut Session,
    events_tx: &broadcast::Sender<SessionEvent>,
    session_id: &SessionId,
    event: Event,
) -> TurnOutcome {
    if session.session_id() != session_id {
        tracing::info!(
            session_id = %session_id,
            current = %session.session_id(),
            "Discarding turn result for a replaced session"
        );
        return TurnOutcome::Discarded;
    }

    let failure = match &event {
        Event::TransportFailed { error } => Some(error.clone()),
        _ => None,
    };

    match transition(session.turn(), event) {
        Ok(result) => {
            session.set_turn(result.new_state);
            apply_effects(session, events_tx, result.effects);
            failure.map_or(TurnOutcome::Answered, TurnOutcome::Failed)
        }
        Err(e) => {
            // Unreachable while the lock discipline holds; never leave it stuck
            tracing::error!(session_id = %session_id, error = %e, "Turn result rejected");
            session.set_turn(TurnState::Idle);
            notify_changed(session, events_tx);
            TurnOutcome::Ignored(e)
        }
    }
}

/// Apply effects in order. Returns the text of a requested turn, if any.
fn apply_effects(
    session: &mut Session,
    events_tx: &broadcast::Sender<SessionEvent>,
    effects: Vec<Effect>,
) -> Option<String> {
    let mut request_text = None;
    for effect in effects {
        match effect {
            Effect::AppendMessage { role, content } => {
                session.push_message(role, content);
            }
            Effect::ClearSafetyWarning => {
                session.dashboard_mut().safety_warning = None;
            }
            Effect::ApplyDashboard(dashboard) => {
                *session.dashboard_mut() = *dashboard;
            }
            Effect::RequestTurn { text } => {
                request_text = Some(text);
            }
            Effect::NotifyChanged => notify_changed(session, events_tx),
        }
    }
    request_text
}

fn notify_changed(session: &Session, events_tx: &broadcast::Sender<SessionEvent>) {
    // No subscribers is fine
    let _ = events_tx.send(SessionEvent::Changed {
        session_id: session.session_id().clone(),
        processing: session.is_processing(),
        message_count: session.messages().len(),
    });
}

fn fresh_session(options: SessionOptions) -> Session {
    let mut session = Session::new();
    if options.welcome_message {
        session.push_message(Role::Assistant, WELCOME_MESSAGE);
    }
    session
}

fn lock<U>(mutex: &Mutex<U>) -> MutexGuard<'_, U> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
