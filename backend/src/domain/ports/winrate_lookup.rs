//! Driving port for public winrate lookups.
//!
//! Inbound adapters call [`WinrateLookup`] with the raw champion name taken
//! from the request. The implementation validates it, consults the cache and
//! falls back to aggregation, so transports stay free of those concerns.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, Winrate};

/// Successful lookup result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinrateAnswer {
    /// Champion the winrate belongs to, as normalised by validation.
    pub champion_name: String,
    /// Wins divided by appearances.
    pub winrate: Winrate,
}

/// Port answering "what is this champion's winrate?".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WinrateLookup: Send + Sync {
    /// Resolve the winrate for `champion_name`.
    ///
    /// Fails with a domain [`Error`] whose code is `bad_request`,
    /// `not_found`, `timeout` or `internal_error`.
    async fn lookup(&self, champion_name: &str) -> Result<WinrateAnswer, Error>;
}
