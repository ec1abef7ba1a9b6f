//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `currency_requests_total` - Total catalog requests handled
//! - `currency_revisions_written_total` - Revisions persisted by write paths
//! - `currency_request_duration_seconds` - Request latency histogram

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total requests handled
    pub requests_total: IntCounter,

    /// Revisions written by create/update/delete paths
    pub revisions_written: IntCounter,

    /// Request latency histogram
    pub request_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = IntCounter::with_opts(Opts::new(
            "currency_requests_total",
            "Total catalog requests handled",
        ))?;
        registry.register(Box::new(requests_total.clone()))?;

        let revisions_written = IntCounter::with_opts(Opts::new(
            "currency_revisions_written_total",
            "Revisions persisted by write paths",
        ))?;
        registry.register(Box::new(revisions_written.clone()))?;

        let request_duration = Histogram::with_opts(
            HistogramOpts::new("currency_request_duration_seconds", "Request latency").buckets(
                vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0],
            ),
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            requests_total,
            revisions_written,
            request_duration,
            registry,
        })
    }

    /// Record a handled request
    pub fn record_request(&self, duration_seconds: f64) {
        self.requests_total.inc();
        self.request_duration.observe(duration_seconds);
    }

    /// Record persisted revisions
    pub fn record_revisions_written(&self, count: usize) {
        self.revisions_written.inc_by(count as u64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.requests_total.get(), 0);
    }

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request(0.01);
        metrics.record_request(0.02);
        assert_eq!(metrics.requests_total.get(), 2);
    }

    #[test]
    fn test_record_revisions_written() {
        let metrics = Metrics::new().unwrap();
        metrics.record_revisions_written(3);
        assert_eq!(metrics.revisions_written.get(), 3);
    }
}
