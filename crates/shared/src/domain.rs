use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ContactFormError;

/// Message shown when the relay could not be reached at all.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Failed to send message. Please try again or email me directly.";

/// Message shown when the relay refused the submission without a usable reason.
pub const RELAY_REJECTED_FALLBACK_MESSAGE: &str = "Failed to send message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Name,
    Email,
    Subject,
    Message,
}

impl FieldKey {
    pub const ALL: [FieldKey; 4] = [
        FieldKey::Name,
        FieldKey::Email,
        FieldKey::Subject,
        FieldKey::Message,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Email => "email",
            FieldKey::Subject => "subject",
            FieldKey::Message => "message",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = ContactFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FieldKey::Name),
            "email" => Ok(FieldKey::Email),
            "subject" => Ok(FieldKey::Subject),
            "message" => Ok(FieldKey::Message),
            other => Err(ContactFormError::InvalidFieldKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl FormFields {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Name => &self.name,
            FieldKey::Email => &self.email,
            FieldKey::Subject => &self.subject,
            FieldKey::Message => &self.message,
        }
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let slot = match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Email => &mut self.email,
            FieldKey::Subject => &mut self.subject,
            FieldKey::Message => &mut self.message,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        FieldKey::ALL.iter().all(|key| self.get(*key).is_empty())
    }

    /// Checks the required-field rules the contact view enforces before sending.
    pub fn validate(&self) -> Result<(), ContactFormError> {
        for key in FieldKey::ALL {
            if self.get(key).is_empty() {
                return Err(ContactFormError::Validation {
                    field: key,
                    reason: "is required",
                });
            }
        }
        if !looks_like_email(&self.email) {
            return Err(ContactFormError::Validation {
                field: FieldKey::Email,
                reason: "must be an email address",
            });
        }
        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Lifecycle of one contact message. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Submitted,
    Failed(String),
}

impl SubmissionState {
    /// Whether the form inputs accept edits in this state.
    pub fn is_editable(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Submitted => "submitted",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSnapshot {
    pub fields: FormFields,
    pub state: SubmissionState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormFields {
        FormFields {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hello".into(),
            message: "Nice site".into(),
        }
    }

    #[test]
    fn field_keys_parse_from_wire_names() {
        for key in FieldKey::ALL {
            assert_eq!(key.as_str().parse::<FieldKey>().expect("parse"), key);
        }
    }

    #[test]
    fn unknown_field_key_is_rejected() {
        let err = "phone".parse::<FieldKey>().expect_err("unknown key");
        assert!(matches!(err, ContactFormError::InvalidFieldKind(ref k) if k == "phone"));
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut fields = filled();
        fields.subject.clear();
        let err = fields.validate().expect_err("missing subject");
        assert!(matches!(
            err,
            ContactFormError::Validation {
                field: FieldKey::Subject,
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_malformed_email() {
        for bad in ["ada", "@example.com", "ada@", "ada @example.com", "a@b@c"] {
            let mut fields = filled();
            fields.email = bad.into();
            assert!(fields.validate().is_err(), "{bad} should be rejected");
        }
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn only_idle_and_failed_are_editable() {
        assert!(SubmissionState::Idle.is_editable());
        assert!(SubmissionState::Failed("x".into()).is_editable());
        assert!(!SubmissionState::Submitting.is_editable());
        assert!(!SubmissionState::Submitted.is_editable());
    }
}
