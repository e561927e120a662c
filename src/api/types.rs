//! API request and response types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Request for one diagnostic turn (`POST /chat`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    /// Raw patient identifier, empty when no patient is selected
    pub patient_id: String,
    pub user_input: String,
}

/// How definite the backend's answer is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    Definitive,
    Fallback,
    #[default]
    InquiryOnly,
}

impl ResponseType {
    /// Parse the wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name.trim() {
            "DEFINITIVE" => Some(Self::Definitive),
            "FALLBACK" => Some(Self::Fallback),
            "INQUIRY_ONLY" => Some(Self::InquiryOnly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definitive => "DEFINITIVE",
            Self::Fallback => "FALLBACK",
            Self::InquiryOnly => "INQUIRY_ONLY",
        }
    }
}

/// One ranked diagnosis as sent by the backend, any field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDiagnosisCandidate {
    #[serde(deserialize_with = "lenient")]
    pub rank: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub disease_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub confidence: Option<f64>,
    /// Qualifier used in fallback answers, e.g. "if accompanied by ..."
    #[serde(deserialize_with = "lenient")]
    pub condition: Option<String>,
}

/// Follow-up question as sent by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFollowUpQuestion {
    #[serde(deserialize_with = "lenient")]
    pub required: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub question_text: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub options: Option<Vec<String>>,
}

/// Response of one diagnostic turn.
///
/// The backend declares `diagnosis_list` and `follow_up_question` as always
/// present, but nothing here trusts that. A field of the wrong type decodes
/// as absent, and list elements that are null or malformed are dropped, so
/// only a body that is not a JSON object fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    /// Kept as text so an unknown value degrades instead of failing decode
    #[serde(deserialize_with = "lenient")]
    pub response_type: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub diagnosis_list: Option<Vec<RawDiagnosisCandidate>>,
    #[serde(deserialize_with = "lenient")]
    pub follow_up_question: Option<RawFollowUpQuestion>,
    #[serde(deserialize_with = "lenient")]
    pub evidence_trace: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub safety_warning: Option<String>,
    /// Chart payload, opaque to the client core
    pub visualization_data: Option<Value>,
    /// HTML or Markdown report
    #[serde(deserialize_with = "lenient")]
    pub formatted_report: Option<String>,
}

/// Decode a field, treating null or a value of the wrong type as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a list, skipping elements that are null or do not fit `T`.
/// Anything other than an array is treated as absent.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Clinician verdict on a turn's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackAction {
    Accept,
    Modify,
    Reject,
}

impl FeedbackAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(Self::Accept),
            "modify" => Some(Self::Modify),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Learning-loop feedback (`POST /feedback`), fire-and-forget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub session_id: String,
    pub patient_id: String,
    pub action: FeedbackAction,
    /// Corrected content, required when `action` is `MODIFY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_content: Option<String>,
}

/// Result of `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    /// Anything else the backend reports
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}
