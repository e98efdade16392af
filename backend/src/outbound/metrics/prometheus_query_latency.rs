//! Prometheus adapter for query service latency.
//!
//! Registers a histogram with the registry shared by the HTTP metrics
//! middleware so it is exposed on the same `/metrics` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use prometheus::{HistogramOpts, HistogramVec, Registry};

use crate::domain::ports::{QueryLatencyMetrics, QueryLatencyMetricsError, QueryOutcome};

/// Bucket bounds in seconds; aggregation over an in-memory table is usually
/// sub-millisecond, timeouts land in the top buckets.
const LATENCY_BUCKETS: &[f64] = &[
    0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0,
];

/// Prometheus-backed query latency recorder.
///
/// # Metric Specification
///
/// - **Name**: `winrate_query_duration_seconds`
/// - **Type**: Histogram
/// - **Labels**: `outcome` (`ok`, `not_found`, `timeout`, `error`)
pub struct PrometheusQueryLatencyMetrics {
    duration_seconds: HistogramVec,
}

impl PrometheusQueryLatencyMetrics {
    /// Create and register the histogram with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already
    /// registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "winrate_query_duration_seconds",
                "Round-trip latency of winrate query service calls",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["outcome"],
        )?;
        registry.register(Box::new(duration_seconds.clone()))?;
        Ok(Self { duration_seconds })
    }
}

#[async_trait]
impl QueryLatencyMetrics for PrometheusQueryLatencyMetrics {
    async fn record(
        &self,
        outcome: QueryOutcome,
        elapsed: Duration,
    ) -> Result<(), QueryLatencyMetricsError> {
        self.duration_seconds
            .get_metric_with_label_values(&[outcome.as_str()])
            .map_err(|err| QueryLatencyMetricsError::export(err.to_string()))?
            .observe(elapsed.as_secs_f64());
        Ok(())
    }
}
