//! Outbound adapters for metrics exporting.
//!
//! Prometheus-backed implementations of domain metrics ports, compiled only
//! with the `metrics` feature.

mod prometheus_query_latency;

pub use prometheus_query_latency::PrometheusQueryLatencyMetrics;
