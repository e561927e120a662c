//! Currently selected patient
//!
//! Lives next to the conversation, not inside it: switching or clearing the
//! patient never resets the session, it only changes what later turns send.

const MASK: char = '*';

/// At most one identified patient reference at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientContext {
    raw_id: String,
    label: String,
    identified: bool,
}

impl PatientContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a patient. A blank id is the same as [`PatientContext::clear`].
    pub fn set(&mut self, id: &str) {
        let id = id.trim();
        if id.is_empty() {
            self.clear();
            return;
        }
        self.raw_id = id.to_string();
        self.label = mask_identifier(id);
        self.identified = true;
        tracing::debug!(patient = %self.label, "Patient selected");
    }

    pub fn clear(&mut self) {
        self.raw_id.clear();
        self.label.clear();
        self.identified = false;
    }

    /// Raw identifier to send with a turn, empty when nobody is selected.
    ///
    /// The backend owns identity validation, so an empty reference is sent
    /// as-is rather than rejected here.
    pub fn reference(&self) -> &str {
        &self.raw_id
    }

    /// Display-safe label, never the raw identifier
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_identified(&self) -> bool {
        self.identified
    }
}

/// Keep the first character and the last two, mask everything between.
/// Identifiers of three characters or fewer are masked entirely.
pub fn mask_identifier(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 3 {
        return std::iter::repeat(MASK).take(chars.len()).collect();
    }
    let tail = chars.len() - 2;
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 || i >= tail { *c } else { MASK })
        .collect()
}
