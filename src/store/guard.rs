use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;

use crate::domain::registration::Email;
use crate::metrics::Metrics;
use crate::models::{NewRegistration, Registration};

use super::{RegistrationStore, StoreError};

// ============================================================================
// Guarded Store
// ============================================================================
//
// Decorates any RegistrationStore:
// - every call is bounded by `call_timeout`; expiry becomes StoreError::Timeout
// - latency and failures are recorded per operation when metrics are attached
//
// No retries: a failed call is returned to the caller exactly once.
//
// ============================================================================

pub struct GuardedStore {
    inner: Arc<dyn RegistrationStore>,
    call_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl GuardedStore {
    pub fn new(inner: Arc<dyn RegistrationStore>, call_timeout: Duration) -> Self {
        Self {
            inner,
            call_timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn guard<T, Fut>(&self, operation: &'static str, call: Fut) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let started = Instant::now();

        let result = match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.call_timeout)),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_store_call(operation, started.elapsed().as_secs_f64());
            if let Err(e) = &result {
                metrics.record_store_failure(operation, e.kind());
            }
        }

        if let Err(StoreError::Timeout(limit)) = &result {
            tracing::warn!(
                operation = operation,
                timeout_ms = limit.as_millis(),
                "Store call timed out"
            );
        }

        result
    }
}

#[async_trait]
impl RegistrationStore for GuardedStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Registration>, StoreError> {
        self.guard("find_by_email", self.inner.find_by_email(email)).await
    }

    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        self.guard("create", self.inner.create(registration)).await
    }

    async fn list_all(&self) -> Result<Vec<Registration>, StoreError> {
        self.guard("list_all", self.inner.list_all()).await
    }
}
