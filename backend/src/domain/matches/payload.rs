//! Conversion of upstream match-history payloads into wide records.
//!
//! Only completed ranked solo/duo games are kept. A participant without a
//! lane assignment (the upstream API reports an empty `teamPosition` for AFK
//! players) discards the whole match, since such games skew winrates.

use serde::Deserialize;
use thiserror::Error;

use super::{Lineup, MatchId, MatchRecordError, MatchRecordWide, Role, Team};
use crate::domain::{ChampionId, ChampionIdValidationError};

/// Queue id of ranked solo/duo games.
pub const RANKED_SOLO_QUEUE_ID: i64 = 420;

const GAME_COMPLETE: &str = "GameComplete";

/// Match payload as returned by the upstream match-history API.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchPayload {
    /// Match metadata block.
    pub metadata: MetadataPayload,
    /// Match details block.
    pub info: InfoPayload,
}

/// `metadata` block of a match payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPayload {
    /// Upstream match identifier.
    pub match_id: String,
}

/// `info` block of a match payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPayload {
    /// How the game ended; `GameComplete` for finished games.
    #[serde(default)]
    pub end_of_game_result: Option<String>,
    /// Queue the game was played in.
    pub queue_id: i64,
    /// Patch string, kept for diagnostics.
    #[serde(default)]
    pub game_version: Option<String>,
    /// Per-player details.
    pub participants: Vec<ParticipantPayload>,
}

/// One participant entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPayload {
    /// Numeric side id (100 blue, 200 red).
    pub team_id: i64,
    /// Lane assignment; empty for AFK players.
    #[serde(default)]
    pub team_position: String,
    /// Champion identifier.
    pub champion_name: String,
    /// Whether the participant's side won.
    pub win: bool,
}

/// Reasons a payload does not yield a wide record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchPayloadError {
    /// The game did not finish normally.
    #[error("match {match_id} did not complete normally")]
    NotCompleted {
        /// Upstream match id.
        match_id: String,
    },
    /// The game was not ranked solo/duo.
    #[error("match {match_id} was played in queue {queue_id}")]
    UnrankedQueue {
        /// Upstream match id.
        match_id: String,
        /// Queue the game was played in.
        queue_id: i64,
    },
    /// A participant had no lane assignment.
    #[error("match {match_id} has a participant without a position ({champion})")]
    MissingPosition {
        /// Upstream match id.
        match_id: String,
        /// Champion of the unassigned participant.
        champion: String,
    },
    /// A participant reported an unknown side.
    #[error("match {match_id} has unknown team id {team_id}")]
    UnknownTeam {
        /// Upstream match id.
        match_id: String,
        /// Reported team id.
        team_id: i64,
    },
    /// Two participants on one side claimed the same role.
    #[error("match {match_id} has two {team} players in {role}")]
    DuplicatePosition {
        /// Upstream match id.
        match_id: String,
        /// Side with the collision.
        team: &'static str,
        /// Contested role.
        role: &'static str,
    },
    /// A side did not field a champion in every role.
    #[error("match {match_id} has no {team} player in {role}")]
    MissingSlot {
        /// Upstream match id.
        match_id: String,
        /// Side with the gap.
        team: &'static str,
        /// Empty role.
        role: &'static str,
    },
    /// Participants disagree about which side won.
    #[error("match {match_id} reports inconsistent win flags")]
    InconsistentOutcome {
        /// Upstream match id.
        match_id: String,
    },
    /// A champion name failed validation.
    #[error("match {match_id} has an invalid champion name: {source}")]
    InvalidChampion {
        /// Upstream match id.
        match_id: String,
        /// Validation failure.
        #[source]
        source: ChampionIdValidationError,
    },
    /// The assembled record violated a record invariant.
    #[error(transparent)]
    Record(#[from] MatchRecordError),
}

impl MatchPayloadError {
    /// Whether the payload was filtered by policy rather than malformed.
    pub const fn is_filtered(&self) -> bool {
        matches!(
            self,
            Self::NotCompleted { .. } | Self::UnrankedQueue { .. } | Self::MissingPosition { .. }
        )
    }
}

#[derive(Default)]
struct SideSlots {
    top: Option<ChampionId>,
    jungle: Option<ChampionId>,
    middle: Option<ChampionId>,
    bottom: Option<ChampionId>,
    utility: Option<ChampionId>,
    win: Option<bool>,
}

impl SideSlots {
    const fn slot_mut(&mut self, role: Role) -> &mut Option<ChampionId> {
        match role {
            Role::Top => &mut self.top,
            Role::Jungle => &mut self.jungle,
            Role::Middle => &mut self.middle,
            Role::Bottom => &mut self.bottom,
            Role::Utility => &mut self.utility,
        }
    }

    fn into_lineup(self, match_id: &str, team: Team) -> Result<Lineup, MatchPayloadError> {
        let take = |slot: Option<ChampionId>, role: Role| {
            slot.ok_or_else(|| MatchPayloadError::MissingSlot {
                match_id: match_id.to_owned(),
                team: team.as_str(),
                role: role.as_str(),
            })
        };
        Ok(Lineup::new(
            take(self.top, Role::Top)?,
            take(self.jungle, Role::Jungle)?,
            take(self.middle, Role::Middle)?,
            take(self.bottom, Role::Bottom)?,
            take(self.utility, Role::Utility)?,
        ))
    }
}

impl MatchPayload {
    /// Convert the payload into a wide record.
    ///
    /// Participants are placed by lane so column assignment does not depend
    /// on the order the upstream API lists them in.
    ///
    /// # Errors
    /// Returns [`MatchPayloadError`]; variants for which
    /// [`MatchPayloadError::is_filtered`] holds are expected policy skips.
    pub fn into_wide_record(self) -> Result<MatchRecordWide, MatchPayloadError> {
        let Self { metadata, info } = self;
        let match_id = metadata.match_id;

        if info.end_of_game_result.as_deref() != Some(GAME_COMPLETE) {
            return Err(MatchPayloadError::NotCompleted { match_id });
        }
        if info.queue_id != RANKED_SOLO_QUEUE_ID {
            return Err(MatchPayloadError::UnrankedQueue {
                match_id,
                queue_id: info.queue_id,
            });
        }

        let mut blue = SideSlots::default();
        let mut red = SideSlots::default();
        for participant in info.participants {
            let Some(role) = Role::from_team_position(&participant.team_position) else {
                return Err(MatchPayloadError::MissingPosition {
                    match_id,
                    champion: participant.champion_name,
                });
            };
            let team = Team::from_riot_team_id(participant.team_id).ok_or_else(|| {
                MatchPayloadError::UnknownTeam {
                    match_id: match_id.clone(),
                    team_id: participant.team_id,
                }
            })?;
            let champion = ChampionId::new(&participant.champion_name).map_err(|source| {
                MatchPayloadError::InvalidChampion {
                    match_id: match_id.clone(),
                    source,
                }
            })?;

            let side = match team {
                Team::Blue => &mut blue,
                Team::Red => &mut red,
            };
            if *side.win.get_or_insert(participant.win) != participant.win {
                return Err(MatchPayloadError::InconsistentOutcome { match_id });
            }
            let slot = side.slot_mut(role);
            if slot.is_some() {
                return Err(MatchPayloadError::DuplicatePosition {
                    match_id,
                    team: team.as_str(),
                    role: role.as_str(),
                });
            }
            *slot = Some(champion);
        }

        let blue_win = match (blue.win, red.win) {
            (Some(blue_win), Some(red_win)) if blue_win != red_win => blue_win,
            (Some(_), Some(_)) => {
                return Err(MatchPayloadError::InconsistentOutcome { match_id });
            }
            _ => {
                let team = if blue.win.is_none() { Team::Blue } else { Team::Red };
                return Err(MatchPayloadError::MissingSlot {
                    match_id,
                    team: team.as_str(),
                    role: Role::Top.as_str(),
                });
            }
        };

        let blue_lineup = blue.into_lineup(&match_id, Team::Blue)?;
        let red_lineup = red.into_lineup(&match_id, Team::Red)?;
        let record = MatchRecordWide::new(MatchId::new(match_id)?, blue_lineup, red_lineup, blue_win)?;
        Ok(record)
    }
}
