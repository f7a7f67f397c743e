use crate::models::{NewRegistration, RegistrationForm};

use super::errors::{Field, FieldError};
use super::value_objects::{Email, EmailError, PersonName};

// ============================================================================
// Field Validator
// ============================================================================
//
// Pure rule evaluation over the raw form. Every field is checked
// independently and all failures are collected, name before email.
//
// ============================================================================

/// Validate a raw submission.
///
/// Returns the normalized candidate, or every field failure found.
pub fn validate(form: &RegistrationForm) -> Result<NewRegistration, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = PersonName::parse(&form.name);
    if name.is_none() {
        errors.push(FieldError::missing(Field::Name));
    }

    let email = match Email::parse(&form.email) {
        Ok(email) => Some(email),
        Err(EmailError::Empty) => {
            errors.push(FieldError::missing(Field::Email));
            None
        }
        Err(EmailError::InvalidFormat) => {
            errors.push(FieldError::invalid_format(Field::Email));
            None
        }
    };

    match (name, email) {
        (Some(name), Some(email)) => Ok(NewRegistration { name, email }),
        _ => Err(errors),
    }
}
