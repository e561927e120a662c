//! Plain-text formatting for the terminal front-end

use crate::session::{DashboardState, Message, Role};
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};

/// `0.823` -> `"82.3%"`
pub fn format_confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// `2026/10/16 14:05`
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%Y/%m/%d %H:%M").to_string()
}

/// One transcript line, prefixed with the speaker
pub fn render_message<Tz>(message: &Message, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::System => "system",
    };
    format!(
        "[{}] {speaker}: {}",
        format_timestamp(&message.timestamp.with_timezone(tz)),
        message.content
    )
}

/// Compact dashboard summary. The formatted report is left out; it is
/// printed on request.
pub fn render_dashboard(dashboard: &DashboardState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", dashboard.response_type.as_str());

    if let Some(warning) = &dashboard.safety_warning {
        let _ = writeln!(out, "!! {warning}");
    }

    if dashboard.diagnosis_list.is_empty() {
        let _ = writeln!(out, "No diagnosis yet.");
    }
    for candidate in &dashboard.diagnosis_list {
        let _ = write!(
            out,
            "{:>2}. {} ({})",
            candidate.rank,
            candidate.disease_name,
            format_confidence(candidate.confidence)
        );
        if let Some(condition) = &candidate.condition {
            let _ = write!(out, " - {condition}");
        }
        out.push('\n');
    }

    let question = &dashboard.follow_up_question;
    if question.required {
        // Required but textless questions still get a prompt line
        let text = question
            .question_text
            .as_deref()
            .unwrap_or("More information is needed.");
        let _ = writeln!(out, "? {text}");
        if !question.options.is_empty() {
            let _ = writeln!(out, "  options: {}", question.options.join(" / "));
        }
    }

    if !dashboard.evidence_trace.is_empty() {
        let _ = writeln!(out, "evidence: {}", dashboard.evidence_trace);
    }
    if dashboard.formatted_report.is_some() {
        let _ = writeln!(out, "(report available: /report)");
    }
    out
}
