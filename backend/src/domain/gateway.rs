//! Gateway use-case: validate, consult the cache, fall back to aggregation.
//!
//! Only successful answers are cached. `NotFound` and `Timeout` results are
//! returned without touching the cache so a champion that gains matches
//! later, or a query that was merely slow, does not stay poisoned. An answer
//! computed while ingestion cleared the cache is returned but not stored,
//! since it may describe the snapshot that was just replaced.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    QueryLatencyMetrics, QueryOutcome, WinrateAnswer, WinrateCache, WinrateLookup, WinrateQuery,
    WinrateQueryError,
};
use crate::domain::{ChampionId, ChampionIdValidationError, Error, TableVersion, Winrate};

/// Default allowance for one query service call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Tunables for [`WinrateGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Table version queried on a cache miss.
    pub version: TableVersion,
    /// Allowance for one query service call.
    pub query_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            version: TableVersion::V2,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Collaborators of the gateway.
#[derive(Clone)]
pub struct GatewayPorts {
    /// Aggregation capability used on cache misses.
    pub query: Arc<dyn WinrateQuery>,
    /// Recency cache owned by the gateway.
    pub cache: Arc<dyn WinrateCache>,
    /// Latency sink for query service calls.
    pub metrics: Arc<dyn QueryLatencyMetrics>,
}

/// [`WinrateLookup`] implementation placing a recency cache in front of a
/// [`WinrateQuery`].
#[derive(Clone)]
pub struct WinrateGateway {
    ports: GatewayPorts,
    settings: GatewaySettings,
}

fn validation_code(err: &ChampionIdValidationError) -> &'static str {
    match err {
        ChampionIdValidationError::Empty => "empty",
        ChampionIdValidationError::TooLong { .. } => "too_long",
        ChampionIdValidationError::ControlCharacter => "control_character",
    }
}

fn invalid_champion(err: &ChampionIdValidationError) -> Error {
    Error::bad_request(err.to_string()).with_details(json!({
        "field": "champion_name",
        "code": validation_code(err),
    }))
}

impl WinrateGateway {
    /// Create a gateway over the given collaborators.
    pub const fn new(ports: GatewayPorts, settings: GatewaySettings) -> Self {
        Self { ports, settings }
    }

    /// Settings the gateway was built with.
    pub const fn settings(&self) -> GatewaySettings {
        self.settings
    }

    async fn query_with_timeout(
        &self,
        champion: &ChampionId,
    ) -> (QueryOutcome, Result<Winrate, Error>) {
        let version = self.settings.version;
        let call = self.ports.query.winrate(champion, version);
        match tokio::time::timeout(self.settings.query_timeout, call).await {
            Ok(Ok(winrate)) => (QueryOutcome::Ok, Ok(winrate)),
            Ok(Err(WinrateQueryError::NoData { .. })) => (
                QueryOutcome::NotFound,
                Err(Error::not_found(format!(
                    "no matches recorded for champion {champion}"
                ))),
            ),
            Ok(Err(err @ WinrateQueryError::Internal { .. })) => {
                error!(champion = %champion, error = %err, "winrate query failed");
                (QueryOutcome::Error, Err(Error::internal(err.to_string())))
            }
            Err(_) => {
                let timeout_ms = self.settings.query_timeout.as_millis();
                warn!(champion = %champion, timeout_ms, "winrate query timed out");
                (
                    QueryOutcome::Timeout,
                    Err(Error::timeout(format!(
                        "winrate query exceeded {timeout_ms} ms"
                    ))),
                )
            }
        }
    }

    async fn record_latency(&self, outcome: QueryOutcome, elapsed: Duration) {
        if let Err(err) = self.ports.metrics.record(outcome, elapsed).await {
            warn!(error = %err, "failed to record query latency");
        }
    }
}

#[async_trait]
impl WinrateLookup for WinrateGateway {
    async fn lookup(&self, champion_name: &str) -> Result<WinrateAnswer, Error> {
        let champion = ChampionId::new(champion_name).map_err(|err| invalid_champion(&err))?;

        if let Some(winrate) = self.ports.cache.get(&champion) {
            debug!(champion = %champion, cache = "hit", "winrate served from cache");
            return Ok(WinrateAnswer {
                champion_name: champion.to_string(),
                winrate,
            });
        }

        let generation = self.ports.cache.generation();
        let started = Instant::now();
        let (outcome, result) = self.query_with_timeout(&champion).await;
        let elapsed = started.elapsed();
        self.record_latency(outcome, elapsed).await;
        info!(
            champion = %champion,
            version = %self.settings.version,
            cache = "miss",
            outcome = outcome.as_str(),
            latency_ms = elapsed.as_secs_f64() * 1000.0,
            "winrate query completed"
        );

        let winrate = result?;
        if !self
            .ports
            .cache
            .put_if_current(generation, champion.clone(), winrate)
        {
            debug!(champion = %champion, "cache cleared during query, answer not cached");
        }
        Ok(WinrateAnswer {
            champion_name: champion.to_string(),
            winrate,
        })
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
