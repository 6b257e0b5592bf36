use serde::{Deserialize, Serialize};

use crate::domain::FormFields;

/// Form-encoded body posted to the message relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "_replyto")]
    pub reply_to: String,
}

impl From<&FormFields> for RelaySubmission {
    fn from(fields: &FormFields) -> Self {
        Self {
            name: fields.name.clone(),
            email: fields.email.clone(),
            subject: fields.subject.clone(),
            message: fields.message.clone(),
            reply_to: fields.email.clone(),
        }
    }
}

/// JSON body the relay returns alongside a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Extracts the human-readable `error` string from a relay failure body.
///
/// Empty bodies, non-JSON bodies, bodies without an `error` key and blank
/// messages all yield `None` so callers fall back to the generic text.
pub fn relay_error_message(body: &[u8]) -> Option<String> {
    let parsed: RelayErrorBody = serde_json::from_slice(body).ok()?;
    parsed.error.filter(|message| !message.trim().is_empty())
}
