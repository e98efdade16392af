//! Internal aggregation capability consumed by the gateway.
//!
//! Implementations compute a winrate against the current table snapshot and
//! never cache; caching belongs to the caller.

use async_trait::async_trait;

use crate::domain::{ChampionId, TableVersion, Winrate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by winrate queries.
    pub enum WinrateQueryError {
        /// The champion has no appearances in the selected table.
        NoData { champion: String } => "no matches recorded for {champion}",
        /// Aggregation detected an invariant violation.
        Internal { message: String } => "winrate query failed: {message}",
    }
}

/// Port computing a champion's winrate over one table version.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WinrateQuery: Send + Sync {
    /// Compute the winrate of `champion` over the `version` table.
    async fn winrate(
        &self,
        champion: &ChampionId,
        version: TableVersion,
    ) -> Result<Winrate, WinrateQueryError>;
}
