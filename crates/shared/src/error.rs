use thiserror::Error;

use crate::domain::{FieldKey, RELAY_REJECTED_FALLBACK_MESSAGE, TRANSPORT_FAILURE_MESSAGE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactFormError {
    #[error("field `{field}` {reason}")]
    Validation {
        field: FieldKey,
        reason: &'static str,
    },
    #[error("unknown contact form field `{0}`")]
    InvalidFieldKind(String),
    #[error("a submission is already in progress")]
    SubmissionInProgress,
    #[error("contact form is not accepting input while {0}")]
    FormLocked(&'static str),
    #[error("contact view has been unmounted")]
    Unmounted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("relay rejected submission with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("relay transport failure: {0}")]
    Transport(String),
}

impl RelayError {
    /// The single error string the contact view shows for this failure.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            RelayError::Rejected { message: None, .. } => {
                RELAY_REJECTED_FALLBACK_MESSAGE.to_string()
            }
            RelayError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
        }
    }
}
