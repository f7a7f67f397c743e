use std::sync::Arc;

use crate::auth::{CredentialCheck, Credentials};
use crate::models::Registration;
use crate::store::RegistrationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    #[error("Unauthorized")]
    Unauthorized,

    /// Store detail is logged, never carried.
    #[error("Sorry! Something went wrong.")]
    Unavailable,
}

impl ListingError {
    pub fn outcome(&self) -> &'static str {
        match self {
            ListingError::Unauthorized => "unauthorized",
            ListingError::Unavailable => "store_error",
        }
    }
}

/// Read path for operators: every registration, newest first.
#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn RegistrationStore>,
    credentials: Arc<dyn CredentialCheck>,
}

impl ListingService {
    pub fn new(store: Arc<dyn RegistrationStore>, credentials: Arc<dyn CredentialCheck>) -> Self {
        Self { store, credentials }
    }

    pub async fn list(
        &self,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<Registration>, ListingError> {
        let Some(credentials) = credentials else {
            tracing::debug!("Listing requested without credentials");
            return Err(ListingError::Unauthorized);
        };

        if !self.credentials.verify(credentials) {
            tracing::warn!(username = %credentials.username, "Rejected listing credentials");
            return Err(ListingError::Unauthorized);
        }

        self.store.list_all().await.map_err(|e| {
            tracing::error!(operation = "list_all", error = %e, "Registration store call failed");
            ListingError::Unavailable
        })
    }
}
