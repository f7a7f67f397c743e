use std::fmt;

use serde::Serialize;

// ============================================================================
// Registration Errors
// ============================================================================

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Enter a valid email";
pub const EMAIL_TAKEN: &str = "This email is already registered";
pub const SERVER_ERROR: &str = "Server error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    MissingField,
    InvalidFormat,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub kind: FailureKind,
    pub message: String,
}

impl FieldError {
    pub fn missing(field: Field) -> Self {
        let message = match field {
            Field::Name => NAME_REQUIRED,
            Field::Email => EMAIL_REQUIRED,
        };

        Self {
            field,
            kind: FailureKind::MissingField,
            message: message.to_string(),
        }
    }

    pub fn invalid_format(field: Field) -> Self {
        Self {
            field,
            kind: FailureKind::InvalidFormat,
            message: EMAIL_INVALID.to_string(),
        }
    }
}

/// Why a submission was not persisted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectionReason {
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),

    #[error("{}", EMAIL_TAKEN)]
    DuplicateEmail,

    #[error("{}", SERVER_ERROR)]
    StoreError,
}

impl RejectionReason {
    /// User facing messages, in display order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            RejectionReason::ValidationFailed(errors) => {
                errors.iter().map(|e| e.message.clone()).collect()
            }
            other => vec![other.to_string()],
        }
    }
}
