//! Shared domain model for the trivia services

use crate::Error;
use serde::{Deserialize, Serialize};

/// Separator used when joining club names into a canonical career key.
pub const SEQUENCE_DELIMITER: &str = " → ";

/// Question difficulty tier, derived from career length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Short,
    Moderate,
    Long,
}

impl Difficulty {
    /// All tiers in presentation order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Short, Difficulty::Moderate, Difficulty::Long];

    /// Classify a career by its number of cleaned stints.
    ///
    /// Up to 4 stints reads as a short career, 5-7 as moderate, 8 or
    /// more as the long journeyman cases.
    pub fn from_stint_count(count: usize) -> Self {
        if count <= 4 {
            Difficulty::Short
        } else if count <= 7 {
            Difficulty::Moderate
        } else {
            Difficulty::Long
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Short => "short",
            Difficulty::Moderate => "moderate",
            Difficulty::Long => "long",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "short" => Ok(Difficulty::Short),
            "moderate" => Ok(Difficulty::Moderate),
            "long" => Ok(Difficulty::Long),
            other => Err(Error::InvalidInput(format!(
                "Unknown difficulty '{}' (expected short, moderate or long)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One club stint in a cleaned career, chronological order.
///
/// Exactly these three fields leave the preparation pipeline; loan
/// bookkeeping never crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stint {
    pub club: String,
    pub logo: Option<String>,
    pub season: String,
}

/// One playable question: a player and their cleaned career sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub player_id: String,
    pub player_name: String,
    pub market_value: f64,
    pub stint_count: usize,
    /// Number of players in the batch whose careers produce the same key.
    pub shared_by: i64,
    pub difficulty: Difficulty,
    pub sequence_key: String,
    pub stints: Vec<Stint>,
}

/// Canonical career key: club names joined in chronological order.
pub fn sequence_key(stints: &[Stint]) -> String {
    stints
        .iter()
        .map(|s| s.club.as_str())
        .collect::<Vec<_>>()
        .join(SEQUENCE_DELIMITER)
}
