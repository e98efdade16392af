//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: in-process LRU cache of computed winrates
//! - **persistence**: JSON-lines file holding the wide match table
//! - **metrics**: Prometheus query latency exporter (feature-gated)
//!
//! Adapters translate between domain types and their storage representation.
//! They contain no business logic.

pub mod cache;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
