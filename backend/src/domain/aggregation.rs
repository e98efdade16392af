//! Winrate aggregation over either table version.
//!
//! The narrow (v2) path counts the champion's rows directly. The wide (v1)
//! path visits each match row once and scores it for the side the champion
//! played on. Lineups never repeat a champion, so both paths agree on the
//! same snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ChampionId;
use super::match_table::TableSnapshot;

/// Table representation a query runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableVersion {
    /// Legacy wide table, one row per match.
    V1,
    /// Narrow table, one row per player slot.
    #[default]
    V2,
}

impl TableVersion {
    /// Lower-case label used in config and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown table version label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table version `{0}`, expected `v1` or `v2`")]
pub struct ParseTableVersionError(String);

impl FromStr for TableVersion {
    type Err = ParseTableVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            _ => Err(ParseTableVersionError(s.to_owned())),
        }
    }
}

/// Win ratio in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Winrate(f64);

impl Winrate {
    /// Ratio of `wins` to `appearances`.
    ///
    /// # Errors
    /// [`AggregationError::NoData`] when `appearances` is zero and
    /// [`AggregationError::InconsistentCounts`] when `wins` exceeds it.
    pub fn from_counts(wins: u64, appearances: u64) -> Result<Self, AggregationError> {
        if appearances == 0 {
            return Err(AggregationError::NoData);
        }
        if wins > appearances {
            return Err(AggregationError::InconsistentCounts { wins, appearances });
        }
        Ok(Self(wins as f64 / appearances as f64))
    }

    /// Wrap a precomputed ratio, rejecting values outside `[0, 1]`.
    pub fn new(value: f64) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value))
    }

    /// The ratio as a float.
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Failures of [`compute_winrate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// The champion has no appearances in the table.
    #[error("no matches recorded for champion")]
    NoData,
    /// More wins than appearances were counted.
    #[error("counted {wins} wins over {appearances} appearances")]
    InconsistentCounts {
        /// Winning appearances.
        wins: u64,
        /// All appearances.
        appearances: u64,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    wins: u64,
    appearances: u64,
}

impl Tally {
    const fn record(&mut self, win: bool) {
        self.appearances += 1;
        if win {
            self.wins += 1;
        }
    }
}

fn tally_narrow(snapshot: &TableSnapshot, champion: &ChampionId) -> Tally {
    let mut tally = Tally::default();
    for row in snapshot.filter_narrow(champion) {
        tally.record(row.win);
    }
    tally
}

fn tally_wide(snapshot: &TableSnapshot, champion: &ChampionId) -> Tally {
    let mut tally = Tally::default();
    for record in snapshot.filter_wide(champion) {
        if let Some(team) = record.side_of(champion) {
            tally.record(team.won(record.blue_win()));
        }
    }
    tally
}

/// Compute a champion's winrate over the selected table version.
///
/// # Errors
/// [`AggregationError::NoData`] when the champion never appears.
///
/// # Examples
/// ```
/// use winrate::domain::{ChampionId, TableSnapshot, TableVersion, compute_winrate};
///
/// let snapshot = TableSnapshot::default();
/// let teemo = ChampionId::new("Teemo").expect("valid champion");
/// assert!(compute_winrate(&snapshot, &teemo, TableVersion::V2).is_err());
/// ```
pub fn compute_winrate(
    snapshot: &TableSnapshot,
    champion: &ChampionId,
    version: TableVersion,
) -> Result<Winrate, AggregationError> {
    let tally = match version {
        TableVersion::V1 => tally_wide(snapshot, champion),
        TableVersion::V2 => tally_narrow(snapshot, champion),
    };
    Winrate::from_counts(tally.wins, tally.appearances)
}
