use std::sync::Arc;

use crate::models::{Registration, RegistrationForm};
use crate::store::{RegistrationStore, StoreError};

use super::errors::RejectionReason;
use super::validator::validate;

// ============================================================================
// Submission Workflow
// ============================================================================
//
// Orchestrates: Received → Validated → Checked → Persisted | Rejected
//
// The duplicate pre-check only buys a friendlier message; the store's
// uniqueness constraint stays the final authority, so a constraint violation
// on create is still reported as DuplicateEmail.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Received,
    Validated,
    Checked,
    Persisted,
    Rejected,
}

/// A submission that was not persisted, with the input echoed for re-display.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: RejectionReason,
    pub input: RegistrationForm,
}

impl Rejection {
    fn new(reason: RejectionReason, input: RegistrationForm) -> Self {
        tracing::debug!(state = ?SubmissionState::Rejected, reason = %reason, "Submission rejected");
        Self { reason, input }
    }

    /// Label used for the submissions metric.
    pub fn outcome(&self) -> &'static str {
        match self.reason {
            RejectionReason::ValidationFailed(_) => "validation_failed",
            RejectionReason::DuplicateEmail => "duplicate_email",
            RejectionReason::StoreError => "store_error",
        }
    }
}

#[derive(Clone)]
pub struct SubmissionWorkflow {
    store: Arc<dyn RegistrationStore>,
}

impl SubmissionWorkflow {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Run one submission to completion. Store failures are surfaced once,
    /// never retried.
    pub async fn submit(&self, input: RegistrationForm) -> Result<Registration, Rejection> {
        tracing::debug!(state = ?SubmissionState::Received, "Submission received");

        let candidate = match validate(&input) {
            Ok(candidate) => candidate,
            Err(errors) => {
                return Err(Rejection::new(RejectionReason::ValidationFailed(errors), input));
            }
        };
        tracing::debug!(state = ?SubmissionState::Validated, "Submission validated");

        match self.store.find_by_email(&candidate.email).await {
            Ok(Some(_)) => return Err(Rejection::new(RejectionReason::DuplicateEmail, input)),
            Ok(None) => {}
            Err(e) => return Err(self.store_failure("find_by_email", e, input)),
        }
        tracing::debug!(state = ?SubmissionState::Checked, "No existing registration for email");

        match self.store.create(candidate).await {
            Ok(registration) => {
                tracing::info!(
                    state = ?SubmissionState::Persisted,
                    registration_id = %registration.id,
                    "📝 Registration persisted"
                );
                Ok(registration)
            }
            Err(StoreError::ConstraintViolation { .. }) => {
                tracing::info!("Email registered concurrently, reporting duplicate");
                Err(Rejection::new(RejectionReason::DuplicateEmail, input))
            }
            Err(e) => Err(self.store_failure("create", e, input)),
        }
    }

    fn store_failure(
        &self,
        operation: &'static str,
        error: StoreError,
        input: RegistrationForm,
    ) -> Rejection {
        tracing::error!(operation = operation, error = %error, "Registration store call failed");
        Rejection::new(RejectionReason::StoreError, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::errors::{FailureKind, Field};
    use crate::domain::registration::Email;
    use crate::models::NewRegistration;
    use crate::store::InMemoryRegistrationStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn workflow() -> (SubmissionWorkflow, Arc<InMemoryRegistrationStore>) {
        let store = Arc::new(InMemoryRegistrationStore::new());
        (SubmissionWorkflow::new(store.clone()), store)
    }

    /// Pre-check always misses, create always loses the race.
    struct RacingStore;

    #[async_trait]
    impl RegistrationStore for RacingStore {
        async fn find_by_email(&self, _email: &Email) -> Result<Option<Registration>, StoreError> {
            Ok(None)
        }

        async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
            Err(StoreError::ConstraintViolation {
                email: registration.email.into_inner(),
            })
        }

        async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
            Ok(Vec::new())
        }
    }

    /// Every call fails; counts create attempts.
    #[derive(Default)]
    struct BrokenStore {
        creates: AtomicUsize,
        fail_lookup: bool,
    }

    #[async_trait]
    impl RegistrationStore for BrokenStore {
        async fn find_by_email(&self, _email: &Email) -> Result<Option<Registration>, StoreError> {
            if self.fail_lookup {
                Err(StoreError::backend("connection refused"))
            } else {
                Ok(None)
            }
        }

        async fn create(&self, _registration: NewRegistration) -> Result<Registration, StoreError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::backend("connection refused"))
        }

        async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
            Err(StoreError::backend("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_valid_submission_persists_normalized_record() {
        let (workflow, store) = workflow();

        let registration = workflow
            .submit(RegistrationForm::new("  Jo ", " Jo@X.com"))
            .await
            .unwrap();

        assert_eq!(registration.name, "Jo");
        assert_eq!(registration.email, "jo@x.com");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_name_is_not_stored() {
        let (workflow, store) = workflow();
        let input = RegistrationForm::new("", "a@b.com");

        let rejection = workflow.submit(input.clone()).await.unwrap_err();

        match &rejection.reason {
            RejectionReason::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, Field::Name);
                assert_eq!(errors[0].kind, FailureKind::MissingField);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
        assert_eq!(rejection.input, input);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_email_is_not_stored() {
        let (workflow, store) = workflow();

        let rejection = workflow
            .submit(RegistrationForm::new("Jo", "not-an-email"))
            .await
            .unwrap_err();

        match &rejection.reason {
            RejectionReason::ValidationFailed(errors) => {
                assert_eq!(errors[0].field, Field::Email);
                assert_eq!(errors[0].kind, FailureKind::InvalidFormat);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_second_identical_submission_is_duplicate() {
        let (workflow, store) = workflow();
        let input = RegistrationForm::new("Jo", "jo@x.com");

        workflow.submit(input.clone()).await.unwrap();
        let rejection = workflow.submit(input.clone()).await.unwrap_err();

        assert_eq!(rejection.reason, RejectionReason::DuplicateEmail);
        assert_eq!(rejection.outcome(), "duplicate_email");
        assert_eq!(rejection.input, input);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_detected_after_normalization() {
        let (workflow, store) = workflow();

        workflow
            .submit(RegistrationForm::new("Jo", "john.doe@gmail.com"))
            .await
            .unwrap();
        let rejection = workflow
            .submit(RegistrationForm::new("Jo", "JohnDoe+promo@googlemail.com"))
            .await
            .unwrap_err();

        assert_eq!(rejection.reason, RejectionReason::DuplicateEmail);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_regional_alias_is_duplicate() {
        let (workflow, store) = workflow();

        workflow
            .submit(RegistrationForm::new("Jo", "jo+a@hotmail.co.uk"))
            .await
            .unwrap();
        let rejection = workflow
            .submit(RegistrationForm::new("Jo", "Jo+b@Hotmail.co.uk"))
            .await
            .unwrap_err();

        assert_eq!(rejection.reason, RejectionReason::DuplicateEmail);
        assert_eq!(rejection.input.email, "Jo+b@Hotmail.co.uk");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_constraint_violation_on_create_maps_to_duplicate() {
        let workflow = SubmissionWorkflow::new(Arc::new(RacingStore));

        let rejection = workflow
            .submit(RegistrationForm::new("Jo", "jo@x.com"))
            .await
            .unwrap_err();

        assert_eq!(rejection.reason, RejectionReason::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_store_failure_on_create_is_not_retried() {
        let store = Arc::new(BrokenStore::default());
        let workflow = SubmissionWorkflow::new(store.clone());
        let input = RegistrationForm::new("Jo", "jo@x.com");

        let rejection = workflow.submit(input.clone()).await.unwrap_err();

        assert_eq!(rejection.reason, RejectionReason::StoreError);
        assert_eq!(rejection.input, input);
        assert_eq!(store.creates.load(Ordering::SeqCst), 1);
        assert!(!rejection.reason.messages()[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_store_failure_on_lookup_skips_create() {
        let store = Arc::new(BrokenStore {
            fail_lookup: true,
            ..Default::default()
        });
        let workflow = SubmissionWorkflow::new(store.clone());

        let rejection = workflow
            .submit(RegistrationForm::new("Jo", "jo@x.com"))
            .await
            .unwrap_err();

        assert_eq!(rejection.reason, RejectionReason::StoreError);
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
    }
}
