// ============================================================================
// Registration Record Store
// ============================================================================
//
// Storage contract for registration documents plus its implementations:
// - ScyllaRegistrationStore:   ScyllaDB table keyed by normalized email
// - InMemoryRegistrationStore: process local map (development, tests)
// - GuardedStore:              per-call timeout and latency metrics
//
// Every implementation enforces email uniqueness on `create`.
//
// ============================================================================

mod guard;
mod memory;
mod registration_store;

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::registration::Email;
use crate::models::{NewRegistration, Registration};

pub use guard::GuardedStore;
pub use memory::InMemoryRegistrationStore;
pub use registration_store::ScyllaRegistrationStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Email already registered: {email}")]
    ConstraintViolation { email: String },

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Backend(error.into())
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::ConstraintViolation { .. } => "constraint_violation",
            StoreError::Timeout(_) => "timeout",
            StoreError::Backend(_) => "backend",
        }
    }
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Exact match on the normalized email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Registration>, StoreError>;

    /// Persist a new record, assigning id and timestamps.
    ///
    /// Fails with [`StoreError::ConstraintViolation`] when the email exists.
    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError>;

    /// All records, newest first.
    async fn list_all(&self) -> Result<Vec<Registration>, StoreError>;
}
