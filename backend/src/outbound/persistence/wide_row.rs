//! On-disk shape of a wide match row.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    ChampionId, ChampionIdValidationError, Lineup, MatchId, MatchRecordError, MatchRecordWide,
    Role, Team,
};

/// Flat row with one column per (side, role) slot.
///
/// Champion columns are named `<side>_<role>` and hold the champion's name
/// as stored, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WideRow {
    /// Match identifier, unique across the store.
    pub match_id: String,
    /// Blue side top laner.
    pub blue_top: String,
    /// Blue side jungler.
    pub blue_jungle: String,
    /// Blue side mid laner.
    pub blue_middle: String,
    /// Blue side bottom laner.
    pub blue_bottom: String,
    /// Blue side support.
    pub blue_utility: String,
    /// Red side top laner.
    pub red_top: String,
    /// Red side jungler.
    pub red_jungle: String,
    /// Red side mid laner.
    pub red_middle: String,
    /// Red side bottom laner.
    pub red_bottom: String,
    /// Red side support.
    pub red_utility: String,
    /// `true` when blue won, `false` when red did.
    pub blue_win: bool,
}

/// Raised when a stored row does not form a valid record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WideRowError {
    /// A champion column failed validation.
    #[error("column {column}: {source}")]
    Champion {
        /// Offending column.
        column: String,
        /// Validation failure.
        #[source]
        source: ChampionIdValidationError,
    },
    /// The assembled record violated a record invariant.
    #[error(transparent)]
    Record(#[from] MatchRecordError),
}

fn column(team: Team, role: Role) -> String {
    format!("{}_{}", team.as_str(), role.as_str().to_ascii_lowercase())
}

fn parse_lineup(team: Team, names: [&str; 5]) -> Result<Lineup, WideRowError> {
    let [top, jungle, middle, bottom, utility] = names;
    let parse = |role: Role, name: &str| {
        ChampionId::new(name).map_err(|source| WideRowError::Champion {
            column: column(team, role),
            source,
        })
    };
    Ok(Lineup::new(
        parse(Role::Top, top)?,
        parse(Role::Jungle, jungle)?,
        parse(Role::Middle, middle)?,
        parse(Role::Bottom, bottom)?,
        parse(Role::Utility, utility)?,
    ))
}

impl From<&MatchRecordWide> for WideRow {
    fn from(record: &MatchRecordWide) -> Self {
        let slot = |team: Team, role: Role| record.lineup(team).champion(role).to_string();
        Self {
            match_id: record.match_id().to_string(),
            blue_top: slot(Team::Blue, Role::Top),
            blue_jungle: slot(Team::Blue, Role::Jungle),
            blue_middle: slot(Team::Blue, Role::Middle),
            blue_bottom: slot(Team::Blue, Role::Bottom),
            blue_utility: slot(Team::Blue, Role::Utility),
            red_top: slot(Team::Red, Role::Top),
            red_jungle: slot(Team::Red, Role::Jungle),
            red_middle: slot(Team::Red, Role::Middle),
            red_bottom: slot(Team::Red, Role::Bottom),
            red_utility: slot(Team::Red, Role::Utility),
            blue_win: record.blue_win(),
        }
    }
}

impl TryFrom<WideRow> for MatchRecordWide {
    type Error = WideRowError;

    fn try_from(row: WideRow) -> Result<Self, Self::Error> {
        let blue = parse_lineup(
            Team::Blue,
            [
                row.blue_top.as_str(),
                row.blue_jungle.as_str(),
                row.blue_middle.as_str(),
                row.blue_bottom.as_str(),
                row.blue_utility.as_str(),
            ],
        )?;
        let red = parse_lineup(
            Team::Red,
            [
                row.red_top.as_str(),
                row.red_jungle.as_str(),
                row.red_middle.as_str(),
                row.red_bottom.as_str(),
                row.red_utility.as_str(),
            ],
        )?;
        Ok(Self::new(MatchId::new(row.match_id)?, blue, red, row.blue_win)?)
    }
}
