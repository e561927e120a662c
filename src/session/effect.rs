//! Effects produced by turn transitions

use super::state::{DashboardState, Role};

/// Effects to be applied by the controller after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append one transcript entry
    AppendMessage { role: Role, content: String },

    /// Drop the previous turn's warning while a new turn is pending
    ClearSafetyWarning,

    /// Replace the whole dashboard
    ApplyDashboard(Box<DashboardState>),

    /// Send the turn to the backend; the only effect that suspends
    RequestTurn { text: String },

    /// Tell observers the session changed
    NotifyChanged,
}

impl Effect {
    pub fn user_message(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant_message(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system_message(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn apply_dashboard(dashboard: DashboardState) -> Self {
        Effect::ApplyDashboard(Box::new(dashboard))
    }
}
