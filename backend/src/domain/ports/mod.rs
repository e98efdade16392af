//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod match_feed;
mod match_repository;
mod query_latency_metrics;
mod winrate_cache;
mod winrate_lookup;
mod winrate_query;

pub use match_feed::MatchFeed;
#[cfg(test)]
pub use match_feed::MockMatchFeed;
#[cfg(test)]
pub use match_repository::MockMatchRepository;
pub use match_repository::{MatchRepository, MatchRepositoryError, NoOpMatchRepository};
#[cfg(test)]
pub use query_latency_metrics::MockQueryLatencyMetrics;
pub use query_latency_metrics::{
    NoOpQueryLatencyMetrics, QueryLatencyMetrics, QueryLatencyMetricsError, QueryOutcome,
};
#[cfg(test)]
pub use winrate_cache::MockWinrateCache;
pub use winrate_cache::WinrateCache;
#[cfg(test)]
pub use winrate_lookup::MockWinrateLookup;
pub use winrate_lookup::{WinrateAnswer, WinrateLookup};
#[cfg(test)]
pub use winrate_query::MockWinrateQuery;
pub use winrate_query::{WinrateQuery, WinrateQueryError};
