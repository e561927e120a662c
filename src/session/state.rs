//! Session state types

use crate::api::ResponseType;
use crate::session_id::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Transcript
// ============================================================================

/// Who a transcript entry is from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    /// Client-side notices, e.g. connectivity failures
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One transcript entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// `<unix millis>-<ordinal>`, unique within a session
    pub id: String,
    pub role: Role,
    /// Exactly as given, user text is not trimmed
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Dashboard
// ============================================================================

/// One ranked diagnosis after reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisCandidate {
    /// 1 is the strongest candidate
    pub rank: u32,
    pub disease_name: String,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub condition: Option<String>,
}

/// Question the backend wants answered before it commits to a diagnosis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub required: bool,
    /// May be absent even when `required` is set; renderers need a fallback
    pub question_text: Option<String>,
    pub options: Vec<String>,
}

impl FollowUpQuestion {
    /// The question to put in front of the user, if there is one to ask
    pub fn prompt(&self) -> Option<&str> {
        if self.required {
            self.question_text.as_deref()
        } else {
            None
        }
    }
}

/// Structured, non-chat output of the latest successful turn.
///
/// Replaced wholesale by each successful turn, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub response_type: ResponseType,
    pub diagnosis_list: Vec<DiagnosisCandidate>,
    pub evidence_trace: String,
    pub safety_warning: Option<String>,
    /// Chart payload, passed through untouched
    pub visualization_data: Value,
    pub follow_up_question: FollowUpQuestion,
    pub formatted_report: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            response_type: ResponseType::InquiryOnly,
            diagnosis_list: Vec::new(),
            evidence_trace: String::new(),
            safety_warning: None,
            visualization_data: Value::Object(serde_json::Map::new()),
            follow_up_question: FollowUpQuestion::default(),
            formatted_report: None,
        }
    }
}

impl DashboardState {
    /// Candidate with the smallest rank; the earliest one wins a tie
    pub fn top_candidate(&self) -> Option<&DiagnosisCandidate> {
        self.diagnosis_list.iter().min_by_key(|c| c.rank)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Turn lifecycle. `Submitting` is the in-flight lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    #[default]
    Idle,
    Submitting,
}

/// Aggregate root for one continuous conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    session_id: SessionId,
    messages: Vec<Message>,
    turn: TurnState,
    dashboard: DashboardState,
    #[serde(skip)]
    next_ordinal: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
            turn: TurnState::Idle,
            dashboard: DashboardState::default(),
            next_ordinal: 0,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn dashboard(&self) -> &DashboardState {
        &self.dashboard
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn is_processing(&self) -> bool {
        self.turn == TurnState::Submitting
    }

    pub(crate) fn set_turn(&mut self, turn: TurnState) {
        self.turn = turn;
    }

    pub(crate) fn dashboard_mut(&mut self) -> &mut DashboardState {
        &mut self.dashboard
    }

    /// Append a message and return a reference to it
    pub(crate) fn push_message(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let timestamp = Utc::now();
        self.next_ordinal += 1;
        self.messages.push(Message {
            id: format!("{}-{}", timestamp.timestamp_millis(), self.next_ordinal),
            role,
            content: content.into(),
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
