//! Champion winrate service library.
//!
//! Hexagonal layout: [`domain`] holds the match tables, aggregation and
//! use-cases behind ports; [`inbound`] and [`outbound`] adapt them to HTTP,
//! the file store, the in-process cache and metrics.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
