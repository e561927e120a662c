//! Response reconciliation
//!
//! Maps a raw backend response onto an always-populated [`DashboardState`].
//! Every field is treated as possibly missing, whatever the backend contract
//! promises, and replaced by a fixed default:
//!
//! | field                 | default                                   |
//! |-----------------------|-------------------------------------------|
//! | `response_type`       | `INQUIRY_ONLY` (also for unknown values)  |
//! | `diagnosis_list`      | empty                                     |
//! | candidate `rank`      | 1-based position (also for `0`)           |
//! | candidate name        | empty                                     |
//! | candidate confidence  | `0.0`, clamped into `[0, 1]`              |
//! | `follow_up_question`  | not required, no text, no options         |
//! | `evidence_trace`      | empty                                     |
//! | `visualization_data`  | empty JSON object                         |
//!
//! Optional text (`safety_warning`, `formatted_report`, `condition`,
//! `question_text`) stays `None` when absent or blank.

use super::state::{DashboardState, DiagnosisCandidate, FollowUpQuestion};
use crate::api::{ChatResponse, RawDiagnosisCandidate, RawFollowUpQuestion, ResponseType};
use serde_json::Value;

/// Reply used when there is neither a question to ask nor a diagnosis
pub const INSUFFICIENT_INFORMATION_REPLY: &str = "Your description was received, but the \
information is insufficient to form a diagnosis. Please refer to the dashboard panel.";

/// Build the dashboard for one successful turn
pub fn normalize(response: ChatResponse) -> DashboardState {
    let ChatResponse {
        response_type,
        diagnosis_list,
        follow_up_question,
        evidence_trace,
        safety_warning,
        visualization_data,
        formatted_report,
    } = response;

    DashboardState {
        response_type: response_type
            .as_deref()
            .and_then(ResponseType::from_wire)
            .unwrap_or_default(),
        diagnosis_list: diagnosis_list
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, raw)| normalize_candidate(i, raw))
            .collect(),
        evidence_trace: evidence_trace.unwrap_or_default(),
        safety_warning: non_blank(safety_warning),
        visualization_data: match visualization_data {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(v) => v,
        },
        follow_up_question: follow_up_question
            .map(normalize_follow_up)
            .unwrap_or_default(),
        formatted_report: non_blank(formatted_report),
    }
}

/// Pick the assistant's transcript reply for a reconciled turn.
///
/// A required follow-up question wins, then a summary of the best-ranked
/// diagnosis that has a name, then the fixed insufficient-information text.
pub fn assistant_reply(dashboard: &DashboardState) -> String {
    if let Some(question) = dashboard.follow_up_question.prompt() {
        return question.to_string();
    }
    match top_named_candidate(dashboard) {
        Some(top) => diagnosis_summary(&top.disease_name),
        None => INSUFFICIENT_INFORMATION_REPLY.to_string(),
    }
}

/// Smallest rank among candidates with a non-empty name, earlier wins ties
pub fn top_named_candidate(dashboard: &DashboardState) -> Option<&DiagnosisCandidate> {
    dashboard
        .diagnosis_list
        .iter()
        .filter(|c| !c.disease_name.is_empty())
        .min_by_key(|c| c.rank)
}

/// One-line summary naming the leading diagnosis
pub fn diagnosis_summary(disease_name: &str) -> String {
    format!(
        "Based on the analysis, the leading consideration is 【{disease_name}】. \
         A detailed diagnostic report and treatment recommendations have been generated."
    )
}

fn normalize_candidate(index: usize, raw: RawDiagnosisCandidate) -> DiagnosisCandidate {
    let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
    DiagnosisCandidate {
        rank: raw.rank.filter(|r| *r > 0).unwrap_or(position),
        disease_name: raw
            .disease_name
            .map(|name| name.trim().to_string())
            .unwrap_or_default(),
        confidence: clamp_confidence(raw.confidence),
        condition: non_blank(raw.condition),
    }
}

fn normalize_follow_up(raw: RawFollowUpQuestion) -> FollowUpQuestion {
    FollowUpQuestion {
        required: raw.required.unwrap_or(false),
        question_text: non_blank(raw.question_text),
        options: raw.options.unwrap_or_default(),
    }
}

fn clamp_confidence(confidence: Option<f64>) -> f64 {
    match confidence {
        Some(c) if c.is_nan() => 0.0,
        Some(c) => c.clamp(0.0, 1.0),
        None => 0.0,
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
