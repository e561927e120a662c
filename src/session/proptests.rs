//! Property-based tests for turn transitions and reconciliation
//!
//! These tests verify key invariants hold across all possible inputs.

use super::reconcile::{
    assistant_reply, normalize, top_named_candidate, INSUFFICIENT_INFORMATION_REPLY,
};
use super::state::{Role, TurnState};
use super::transition::{transition, TransitionError, CONNECTIVITY_NOTICE};
use super::{Effect, Event};
use crate::api::{ChatResponse, RawDiagnosisCandidate, RawFollowUpQuestion};
use crate::transport::{TransportError, TransportErrorKind};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n\r]{0,8}"
}

fn arb_text() -> impl Strategy<Value = String> {
    "[ \t]{0,3}[a-zA-Z0-9?,.]{1,40}[ \n]{0,3}"
}

fn arb_opt_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![Just(String::new()), Just("  ".to_string()), "[a-zA-Z ]{1,30}"])
}

fn arb_response_type() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("DEFINITIVE".to_string()),
        Just("FALLBACK".to_string()),
        Just("INQUIRY_ONLY".to_string()),
        "[A-Z_]{1,12}",
    ])
}

fn arb_candidate() -> impl Strategy<Value = RawDiagnosisCandidate> {
    (
        prop::option::of(0u32..10),
        arb_opt_text(),
        prop::option::of(prop_oneof![-2.0f64..3.0, Just(f64::NAN), Just(f64::INFINITY)]),
        arb_opt_text(),
    )
        .prop_map(|(rank, disease_name, confidence, condition)| RawDiagnosisCandidate {
            rank,
            disease_name,
            confidence,
            condition,
        })
}

fn arb_follow_up() -> impl Strategy<Value = RawFollowUpQuestion> {
    (
        prop::option::of(any::<bool>()),
        arb_opt_text(),
        prop::option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
    )
        .prop_map(|(required, question_text, options)| RawFollowUpQuestion {
            required,
            question_text,
            options,
        })
}

fn arb_visualization() -> impl Strategy<Value = Option<Value>> {
    prop::option::of(prop_oneof![
        Just(Value::Null),
        Just(json!({})),
        Just(json!({ "series": [{ "data": [0.4, 0.6] }] })),
        Just(json!([1, 2, 3])),
    ])
}

fn arb_response() -> impl Strategy<Value = ChatResponse> {
    (
        arb_response_type(),
        prop::option::of(prop::collection::vec(arb_candidate(), 0..5)),
        prop::option::of(arb_follow_up()),
        arb_opt_text(),
        arb_opt_text(),
        arb_visualization(),
        arb_opt_text(),
    )
        .prop_map(
            |(
                response_type,
                diagnosis_list,
                follow_up_question,
                evidence_trace,
                safety_warning,
                visualization_data,
                formatted_report,
            )| ChatResponse {
                response_type,
                diagnosis_list,
                follow_up_question,
                evidence_trace,
                safety_warning,
                visualization_data,
                formatted_report,
            },
        )
}

fn arb_error() -> impl Strategy<Value = TransportError> {
    (
        prop_oneof![
            Just(TransportErrorKind::Network),
            Just(TransportErrorKind::Timeout),
            Just(TransportErrorKind::ServerError),
            Just(TransportErrorKind::RateLimit),
            Just(TransportErrorKind::Auth),
            Just(TransportErrorKind::InvalidRequest),
            Just(TransportErrorKind::Decode),
            Just(TransportErrorKind::Unknown),
        ],
        "[a-z ]{0,20}",
    )
        .prop_map(|(kind, message)| TransportError::new(kind, message))
}

fn appended(effects: &[Effect]) -> Vec<(Role, &str)> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendMessage { role, content } => Some((*role, content.as_str())),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Transition Properties
// ============================================================================

proptest! {
    #[test]
    fn blank_input_never_starts_a_turn(text in arb_blank_text()) {
        let result = transition(TurnState::Idle, Event::Submit { text });
        prop_assert!(matches!(result, Err(TransitionError::EmptyInput)));
    }

    #[test]
    fn submit_while_submitting_is_always_rejected(text in prop_oneof![arb_text(), arb_blank_text()]) {
        let result = transition(TurnState::Submitting, Event::Submit { text });
        prop_assert!(matches!(result, Err(TransitionError::Busy)));
    }

    #[test]
    fn accepted_submit_appends_exactly_one_user_message(text in arb_text()) {
        let result = transition(TurnState::Idle, Event::Submit { text: text.clone() }).unwrap();

        prop_assert_eq!(result.new_state, TurnState::Submitting);
        prop_assert_eq!(appended(&result.effects), vec![(Role::User, text.as_str())]);

        let requests: Vec<_> = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::RequestTurn { .. }))
            .collect();
        prop_assert_eq!(requests.len(), 1);
        prop_assert!(result.effects.contains(&Effect::ClearSafetyWarning));
        prop_assert!(!result.effects.iter().any(|e| matches!(e, Effect::ApplyDashboard(_))));
    }

    #[test]
    fn response_settles_with_exactly_one_assistant_message(response in arb_response()) {
        let result = transition(TurnState::Submitting, Event::ResponseReceived { response }).unwrap();

        prop_assert_eq!(result.new_state, TurnState::Idle);
        let messages = appended(&result.effects);
        prop_assert_eq!(messages.len(), 1);
        prop_assert_eq!(messages[0].0, Role::Assistant);
        prop_assert!(!messages[0].1.trim().is_empty());

        let dashboards = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::ApplyDashboard(_)))
            .count();
        prop_assert_eq!(dashboards, 1);
    }

    #[test]
    fn failure_settles_with_exactly_one_system_message(error in arb_error()) {
        let result = transition(TurnState::Submitting, Event::TransportFailed { error }).unwrap();

        prop_assert_eq!(result.new_state, TurnState::Idle);
        prop_assert_eq!(appended(&result.effects), vec![(Role::System, CONNECTIVITY_NOTICE)]);
        prop_assert!(!result.effects.iter().any(|e| matches!(e, Effect::ApplyDashboard(_))));
    }

    #[test]
    fn settle_events_are_invalid_when_idle(response in arb_response(), error in arb_error()) {
        let answered = transition(TurnState::Idle, Event::ResponseReceived { response });
        prop_assert!(matches!(answered, Err(TransitionError::InvalidTransition(_))));

        let failed = transition(TurnState::Idle, Event::TransportFailed { error });
        prop_assert!(matches!(failed, Err(TransitionError::InvalidTransition(_))));
    }
}

// ============================================================================
// Reconciliation Properties
// ============================================================================

proptest! {
    #[test]
    fn normalized_dashboard_is_always_well_formed(response in arb_response()) {
        let expected_len = response.diagnosis_list.as_ref().map_or(0, Vec::len);
        let dashboard = normalize(response);

        prop_assert_eq!(dashboard.diagnosis_list.len(), expected_len);
        for candidate in &dashboard.diagnosis_list {
            prop_assert!(candidate.rank >= 1);
            prop_assert!((0.0..=1.0).contains(&candidate.confidence));
            prop_assert!(candidate.condition.as_deref().map_or(true, |c| !c.trim().is_empty()));
        }
        prop_assert!(!dashboard.visualization_data.is_null());
        prop_assert!(dashboard.safety_warning.as_deref().map_or(true, |w| !w.trim().is_empty()));
        prop_assert!(dashboard.formatted_report.as_deref().map_or(true, |r| !r.trim().is_empty()));
    }

    #[test]
    fn reply_follows_priority(response in arb_response()) {
        let dashboard = normalize(response);
        let reply = assistant_reply(&dashboard);

        if let Some(question) = dashboard.follow_up_question.prompt() {
            prop_assert_eq!(reply, question);
        } else if let Some(top) = top_named_candidate(&dashboard) {
            prop_assert!(reply.contains(&top.disease_name));
        } else {
            prop_assert_eq!(reply, INSUFFICIENT_INFORMATION_REPLY);
        }
    }
}
