//! Champion identifier used as the aggregation and cache key.
use thiserror::Error;

/// Upper bound on identifier length; real champion names are far shorter.
pub const CHAMPION_ID_MAX_LEN: usize = 64;

/// Validated champion identifier, for example `Ahri` or `MonkeyKing`.
///
/// Matching is exact and case sensitive, mirroring the identifiers recorded
/// by the ingestion feed. Surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChampionId(String);

impl ChampionId {
    /// Construct an identifier after validating it is non-blank and bounded.
    ///
    /// # Examples
    /// ```
    /// use winrate::domain::ChampionId;
    ///
    /// let ahri = ChampionId::new(" Ahri ").expect("valid champion");
    /// assert_eq!(ahri.as_str(), "Ahri");
    /// assert!(ChampionId::new("   ").is_err());
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, ChampionIdValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ChampionIdValidationError::Empty);
        }
        if trimmed.chars().count() > CHAMPION_ID_MAX_LEN {
            return Err(ChampionIdValidationError::TooLong {
                max: CHAMPION_ID_MAX_LEN,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ChampionIdValidationError::ControlCharacter);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the underlying identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ChampionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ChampionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ChampionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Validation errors returned when constructing [`ChampionId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChampionIdValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("champion name must not be empty")]
    Empty,
    /// Identifier exceeds the maximum length.
    #[error("champion name must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Identifier contains control characters.
    #[error("champion name must not contain control characters")]
    ControlCharacter,
}
