use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::domain::registration::{Email, PersonName};

// ============================================================================
// Registration Models
// ============================================================================
//
// - RegistrationForm: raw form input, echoed back verbatim on rejection
// - NewRegistration:  validated, normalized candidate (transient)
// - Registration:     stored record with store-assigned id and timestamps
//
// ============================================================================

/// Raw `application/x-www-form-urlencoded` body of `POST /register`.
///
/// Absent fields decode as empty strings so that the validator, not the
/// form extractor, reports them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RegistrationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl RegistrationForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Candidate record produced by the validator and handed to the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRegistration {
    pub name: PersonName,
    pub email: Email,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Registration {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Build a freshly created record. Both timestamps start equal.
    pub fn create(candidate: NewRegistration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: candidate.name.into_inner(),
            email: candidate.email.into_inner(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Newest first; equal timestamps fall back to the (time ordered) id.
pub fn sort_newest_first(registrations: &mut [Registration]) {
    registrations.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
