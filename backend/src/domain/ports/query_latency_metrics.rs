//! Domain port for recording query service round-trip latency.
//!
//! The gateway reports every call it makes to the query service, labelled
//! with the outcome, without depending on a particular metrics backend.

use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording latency metrics.
    pub enum QueryLatencyMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "query latency exporter failed: {message}",
    }
}

/// How a query service call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOutcome {
    /// A winrate was computed.
    Ok,
    /// The champion had no appearances.
    NotFound,
    /// The call exceeded the gateway allowance.
    Timeout,
    /// The call failed for any other reason.
    Error,
}

impl QueryOutcome {
    /// Label value used by metrics backends.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }
}

/// Metrics port for query service latency.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryLatencyMetrics: Send + Sync {
    /// Record one query service call.
    async fn record(
        &self,
        outcome: QueryOutcome,
        elapsed: Duration,
    ) -> Result<(), QueryLatencyMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpQueryLatencyMetrics;

#[async_trait]
impl QueryLatencyMetrics for NoOpQueryLatencyMetrics {
    async fn record(
        &self,
        _outcome: QueryOutcome,
        _elapsed: Duration,
    ) -> Result<(), QueryLatencyMetricsError> {
        Ok(())
    }
}
