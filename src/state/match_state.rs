use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Epoch timestamp expressed in milliseconds.
pub type Timestamp = i64;

/// Volleyball rule set the match is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Six-a-side indoor volleyball, best of five.
    #[default]
    Indoor,
    /// Beach volleyball, best of three.
    Beach,
    /// Snow volleyball, best of three.
    Snow,
}

impl Variant {
    /// Lowercase tag used in configuration files and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Indoor => "indoor",
            Variant::Beach => "beach",
            Variant::Snow => "snow",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "indoor" => Ok(Variant::Indoor),
            "beach" => Ok(Variant::Beach),
            "snow" => Ok(Variant::Snow),
            other => Err(format!(
                "unknown variant `{other}`: expected indoor, beach or snow"
            )),
        }
    }
}

/// One of the two sides of the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    /// Home side.
    A,
    /// Away side.
    B,
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::A => f.write_str("A"),
            TeamSide::B => f.write_str("B"),
        }
    }
}

impl FromStr for TeamSide {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "A" => Ok(TeamSide::A),
            "B" => Ok(TeamSide::B),
            other => Err(EngineError::InvalidTeam(other.to_string())),
        }
    }
}

/// Lifecycle status of a single set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetStatus {
    /// Not started yet.
    Pending,
    /// Rallies are being played.
    InProgress,
    /// Finished with a winner.
    Completed,
}

impl SetStatus {
    /// Wire tag for the status.
    pub fn as_str(self) -> &'static str {
        match self {
            SetStatus::Pending => "pending",
            SetStatus::InProgress => "in_progress",
            SetStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(SetStatus::Pending),
            "in_progress" => Ok(SetStatus::InProgress),
            "completed" => Ok(SetStatus::Completed),
            other => Err(format!(
                "Invalid status `{other}`: expected pending, in_progress or completed"
            )),
        }
    }
}

/// Team identity shown on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display name.
    pub name: String,
    /// Optional jersey color (CSS color string).
    #[serde(default)]
    pub color: Option<String>,
    /// Logo asset reference. Never rolled back by undo.
    #[serde(default)]
    pub logo: Option<String>,
}

impl Team {
    /// Team with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            logo: None,
        }
    }
}

/// Per-team counters kept alongside the score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatistics {
    /// Points scored directly from the serve.
    pub aces: u32,
    /// Points scored from an attack.
    pub attacks: u32,
    /// Points scored from a block.
    pub blocks: u32,
    /// Unforced errors.
    pub errors: u32,
}

/// Statistics block owned by the match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Counters of team A.
    pub team_a: TeamStatistics,
    /// Counters of team B.
    pub team_b: TeamStatistics,
}

/// A set record, either historical or the body of the live set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    /// 1-based set number, unique within the match.
    pub set_number: u32,
    /// Points of team A.
    pub score_a: u32,
    /// Points of team B.
    pub score_b: u32,
    /// Lifecycle state; the only completion flag kept.
    pub status: SetStatus,
    /// Epoch milliseconds when play began.
    #[serde(default)]
    pub start_time: Option<Timestamp>,
    /// Epoch milliseconds when the set was completed.
    #[serde(default)]
    pub end_time: Option<Timestamp>,
    /// Whole minutes between start and end, rounded.
    #[serde(default)]
    pub duration: Option<i64>,
}

impl SetRecord {
    /// Fresh pending set with a 0-0 score.
    pub fn pending(set_number: u32) -> Self {
        Self {
            set_number,
            score_a: 0,
            score_b: 0,
            status: SetStatus::Pending,
            start_time: None,
            end_time: None,
            duration: None,
        }
    }

    /// Score of the given side.
    pub fn score(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::A => self.score_a,
            TeamSide::B => self.score_b,
        }
    }

    /// Mutable score of the given side.
    pub fn score_mut(&mut self, side: TeamSide) -> &mut u32 {
        match side {
            TeamSide::A => &mut self.score_a,
            TeamSide::B => &mut self.score_b,
        }
    }

    /// Whether the status is `completed`.
    pub fn is_completed(&self) -> bool {
        self.status == SetStatus::Completed
    }
}

/// The single live set of a match. Only mutable score target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSet {
    /// Score, status and times of the live set.
    #[serde(flatten)]
    pub set: SetRecord,
    /// Side holding the serve.
    pub serving_team: TeamSide,
}

impl CurrentSet {
    /// Pending live set waiting to be started.
    pub fn pending(set_number: u32, serving_team: TeamSide) -> Self {
        Self {
            set: SetRecord::pending(set_number),
            serving_team,
        }
    }

    /// Number of the live set.
    pub fn set_number(&self) -> u32 {
        self.set.set_number
    }

    /// Status of the live set.
    pub fn status(&self) -> SetStatus {
        self.set.status
    }

    /// Whether points can be scored.
    pub fn is_in_progress(&self) -> bool {
        self.set.status == SetStatus::InProgress
    }
}

/// Aggregate root for one volleyball match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match id.
    pub id: Uuid,
    /// Home team.
    pub team_a: Team,
    /// Away team.
    pub team_b: Team,
    /// Completed sets in insertion order.
    pub sets: Vec<SetRecord>,
    /// The single live set.
    pub current_set: CurrentSet,
    /// Per-team counters.
    #[serde(default)]
    pub statistics: Statistics,
    /// Rule variant the match is played under.
    pub variant: Variant,
    /// Last modification, epoch milliseconds.
    pub updated_at: Timestamp,
}

impl Match {
    /// Build a match waiting for its first set, team A serving.
    pub fn new(variant: Variant, team_a: Team, team_b: Team, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            sets: Vec::new(),
            current_set: CurrentSet::pending(1, TeamSide::A),
            statistics: Statistics::default(),
            variant,
            updated_at: now,
        }
    }

    /// Find a record of the completed-sets list by its number.
    pub fn find_completed_set(&self, set_number: u32) -> Option<&SetRecord> {
        self.sets.iter().find(|set| set.set_number == set_number)
    }

    /// Records in `sets` whose status is completed.
    pub fn completed_sets(&self) -> Vec<SetRecord> {
        self.sets
            .iter()
            .filter(|set| set.is_completed())
            .cloned()
            .collect()
    }

    /// Highest set number stored in the completed-sets list.
    pub fn last_set_number(&self) -> Option<u32> {
        self.sets.iter().map(|set| set.set_number).max()
    }
}
