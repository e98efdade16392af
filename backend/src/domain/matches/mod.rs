//! Match records in their two representations.
//!
//! The wide form ([`MatchRecordWide`]) stores one row per match with a
//! champion per (side, role) slot and a single `blue_win` flag. The narrow
//! form ([`MatchRecordNarrow`]) stores one row per player slot with a
//! team-relative `win` flag and is derived from the wide form by
//! [`MatchRecordWide::explode`].

mod payload;

pub use payload::{
    InfoPayload, MatchPayload, MatchPayloadError, MetadataPayload, ParticipantPayload,
    RANKED_SOLO_QUEUE_ID,
};

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::ChampionId;

/// Side of the map a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Team {
    /// Blue side (Riot team id 100).
    Blue,
    /// Red side (Riot team id 200).
    Red,
}

impl Team {
    /// Both sides in column order.
    pub const ALL: [Self; 2] = [Self::Blue, Self::Red];

    /// Map an upstream numeric team id.
    pub const fn from_riot_team_id(team_id: i64) -> Option<Self> {
        match team_id {
            100 => Some(Self::Blue),
            200 => Some(Self::Red),
            _ => None,
        }
    }

    /// Whether this side won given the wide row's `blue_win` flag.
    pub const fn won(self, blue_win: bool) -> bool {
        match self {
            Self::Blue => blue_win,
            Self::Red => !blue_win,
        }
    }

    /// Lower-case label used in storage and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }
}

/// Lane position, in the fixed column order used by the wide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Top lane.
    Top,
    /// Jungle.
    Jungle,
    /// Middle lane.
    Middle,
    /// Bottom lane carry.
    Bottom,
    /// Support.
    Utility,
}

impl Role {
    /// Roles in column order.
    pub const ALL: [Self; 5] = [
        Self::Top,
        Self::Jungle,
        Self::Middle,
        Self::Bottom,
        Self::Utility,
    ];

    /// Parse the upstream `teamPosition` value. Empty strings (AFK players)
    /// and unknown values yield `None`.
    pub fn from_team_position(value: &str) -> Option<Self> {
        match value {
            "TOP" => Some(Self::Top),
            "JUNGLE" => Some(Self::Jungle),
            "MIDDLE" => Some(Self::Middle),
            "BOTTOM" => Some(Self::Bottom),
            "UTILITY" => Some(Self::Utility),
            _ => None,
        }
    }

    /// Upper-case label matching the upstream `teamPosition` value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Jungle => "JUNGLE",
            Self::Middle => "MIDDLE",
            Self::Bottom => "BOTTOM",
            Self::Utility => "UTILITY",
        }
    }
}

/// Unique match identifier such as `NA1_5012345678`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(String);

impl MatchId {
    /// Construct a match id, rejecting blank or padded values.
    pub fn new(value: impl Into<String>) -> Result<Self, MatchRecordError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(MatchRecordError::EmptyMatchId);
        }
        if raw.trim() != raw {
            return Err(MatchRecordError::PaddedMatchId);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when assembling match records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchRecordError {
    /// Match id is blank.
    #[error("match id must not be empty")]
    EmptyMatchId,
    /// Match id has surrounding whitespace.
    #[error("match id must not contain surrounding whitespace")]
    PaddedMatchId,
    /// A champion fills more than one slot in the same match.
    #[error("champion {champion} appears more than once in match {match_id}")]
    DuplicateChampion {
        /// Offending match.
        match_id: String,
        /// Champion seen twice.
        champion: String,
    },
}

/// The five champions fielded by one side, one per role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    top: ChampionId,
    jungle: ChampionId,
    middle: ChampionId,
    bottom: ChampionId,
    utility: ChampionId,
}

impl Lineup {
    /// Build a lineup from champions given in role order
    /// (top, jungle, middle, bottom, utility).
    pub const fn new(
        top: ChampionId,
        jungle: ChampionId,
        middle: ChampionId,
        bottom: ChampionId,
        utility: ChampionId,
    ) -> Self {
        Self {
            top,
            jungle,
            middle,
            bottom,
            utility,
        }
    }

    /// Champion playing the given role.
    pub const fn champion(&self, role: Role) -> &ChampionId {
        match role {
            Role::Top => &self.top,
            Role::Jungle => &self.jungle,
            Role::Middle => &self.middle,
            Role::Bottom => &self.bottom,
            Role::Utility => &self.utility,
        }
    }

    /// Iterate `(role, champion)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &ChampionId)> + '_ {
        Role::ALL.into_iter().map(|role| (role, self.champion(role)))
    }

    /// Whether the champion plays any role in this lineup.
    pub fn contains(&self, champion: &ChampionId) -> bool {
        self.iter().any(|(_, candidate)| candidate == champion)
    }
}

/// One match in wide (v1) form.
///
/// ## Invariants
/// - Exactly one champion per (side, role).
/// - No champion occupies more than one of the ten slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecordWide {
    match_id: MatchId,
    blue: Lineup,
    red: Lineup,
    blue_win: bool,
}

impl MatchRecordWide {
    /// Assemble a wide record, enforcing champion uniqueness across slots.
    pub fn new(
        match_id: MatchId,
        blue: Lineup,
        red: Lineup,
        blue_win: bool,
    ) -> Result<Self, MatchRecordError> {
        let mut seen = HashSet::with_capacity(10);
        for (_, champion) in blue.iter().chain(red.iter()) {
            if !seen.insert(champion) {
                return Err(MatchRecordError::DuplicateChampion {
                    match_id: match_id.to_string(),
                    champion: champion.to_string(),
                });
            }
        }
        Ok(Self {
            match_id,
            blue,
            red,
            blue_win,
        })
    }

    /// Unique match identifier.
    pub const fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Lineup fielded by the given side.
    pub const fn lineup(&self, team: Team) -> &Lineup {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }

    /// Whether blue side won the match.
    pub const fn blue_win(&self) -> bool {
        self.blue_win
    }

    /// Side on which the champion played, if it played at all.
    pub fn side_of(&self, champion: &ChampionId) -> Option<Team> {
        Team::ALL
            .into_iter()
            .find(|team| self.lineup(*team).contains(champion))
    }

    /// Emit the ten narrow rows for this match, blue side first, each side in
    /// role order.
    pub fn explode(&self) -> impl Iterator<Item = MatchRecordNarrow> + '_ {
        Team::ALL.into_iter().flat_map(move |team| {
            self.lineup(team)
                .iter()
                .map(move |(role, champion)| MatchRecordNarrow {
                    match_id: self.match_id.clone(),
                    team,
                    champion: champion.clone(),
                    role,
                    win: team.won(self.blue_win),
                })
        })
    }
}

/// One player slot in narrow (v2) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchRecordNarrow {
    /// Match the slot belongs to.
    pub match_id: MatchId,
    /// Side the champion played on.
    pub team: Team,
    /// Champion in the slot.
    pub champion: ChampionId,
    /// Role the champion played.
    pub role: Role,
    /// Whether this side won.
    pub win: bool,
}

#[cfg(test)]
pub(crate) mod fixtures;
