// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::configure;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Registration submissions by outcome
// - Listing requests by outcome
// - Record store call latency and failures
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Workflow Metrics
    pub submissions_total: IntCounterVec,
    pub listing_requests_total: IntCounterVec,

    // Store Metrics
    pub store_operation_duration: HistogramVec,
    pub store_operation_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Workflow Metrics
        let submissions_total = IntCounterVec::new(
            Opts::new("registration_submissions_total", "Registration submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let listing_requests_total = IntCounterVec::new(
            Opts::new("listing_requests_total", "Registration listing requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(listing_requests_total.clone()))?;

        // Store Metrics
        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new("store_operation_duration_seconds", "Record store call duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        let store_operation_failures = IntCounterVec::new(
            Opts::new("store_operation_failures_total", "Record store calls that failed"),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(store_operation_failures.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            listing_requests_total,
            store_operation_duration,
            store_operation_failures,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_submission(&self, outcome: &str) {
        self.submissions_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_listing(&self, outcome: &str) {
        self.listing_requests_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_store_call(&self, operation: &str, duration_secs: f64) {
        self.store_operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_store_failure(&self, operation: &str, kind: &str) {
        self.store_operation_failures
            .with_label_values(&[operation, kind])
            .inc();
    }
}
