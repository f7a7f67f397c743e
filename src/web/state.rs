use std::sync::Arc;

use crate::auth::CredentialCheck;
use crate::domain::registration::{ListingService, SubmissionWorkflow};
use crate::metrics::Metrics;
use crate::store::RegistrationStore;

/// Shared, read-only request state. The store handle is the only resource
/// requests contend on.
pub struct AppState {
    pub workflow: SubmissionWorkflow,
    pub listing: ListingService,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        credentials: Arc<dyn CredentialCheck>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            workflow: SubmissionWorkflow::new(store.clone()),
            listing: ListingService::new(store, credentials),
            metrics,
        }
    }
}
