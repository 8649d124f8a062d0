//! DTO definitions used by the match control API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_timestamp, validation::validate_delta},
    error::EngineError,
    services::match_service::MatchSession,
    state::{
        match_state::{CurrentSet, Match, SetRecord, SetStatus, Team},
        update::SetUpdate,
    },
};

/// Request to add or remove a point.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreChangeRequest {
    /// `A` or `B`.
    pub team: String,
    /// `1` to score, `-1` to correct.
    pub delta: i64,
}

impl Validate for ScoreChangeRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_delta(self.delta) {
            errors.add("delta", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request to correct the serving team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ServeChangeRequest {
    /// `A` or `B`.
    pub team: String,
}

/// Partial edit of a set.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SetUpdateRequest {
    /// New score for team A.
    #[serde(default)]
    pub score_a: Option<i64>,
    /// New score for team B.
    #[serde(default)]
    pub score_b: Option<i64>,
    /// One of `pending`, `in_progress`, `completed`.
    #[serde(default)]
    pub status: Option<String>,
    /// If not specified, keeps the start time.
    /// If null is specified, removes it.
    /// If a number is specified, sets it (epoch milliseconds).
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub start_time: Option<Option<i64>>,
    /// Same semantics as `start_time`. Must be null to reopen a completed set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub end_time: Option<Option<i64>>,
}

impl TryFrom<SetUpdateRequest> for SetUpdate {
    type Error = EngineError;

    fn try_from(value: SetUpdateRequest) -> Result<Self, Self::Error> {
        let status = value
            .status
            .as_deref()
            .map(str::parse::<SetStatus>)
            .transpose()
            .map_err(|message| EngineError::ValidationFailed(vec![message]))?;

        Ok(Self {
            score_a: value.score_a,
            score_b: value.score_b,
            status,
            start_time: value.start_time.into(),
            end_time: value.end_time.into(),
        })
    }
}

/// Whole-match replacement pushed by another control surface.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceMatchRequest {
    /// Match that replaces the current one.
    #[schema(value_type = Object)]
    pub snapshot: Match,
}

/// Team identity as shown to clients.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TeamSummary {
    /// Display name.
    pub name: String,
    /// Team color, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Logo reference, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            color: team.color.clone(),
            logo: team.logo.clone(),
        }
    }
}

/// Set record as exposed to clients, including the legacy `completed` flag.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SetSummary {
    /// Set number.
    pub set_number: u32,
    /// Points of team A.
    pub score_a: u32,
    /// Points of team B.
    pub score_b: u32,
    /// `pending`, `in_progress` or `completed`.
    pub status: String,
    /// Epoch milliseconds.
    pub start_time: Option<i64>,
    /// Epoch milliseconds.
    pub end_time: Option<i64>,
    /// Rounded minutes.
    pub duration: Option<i64>,
    /// Mirrors `status == "completed"` for older clients.
    pub completed: bool,
}

impl From<&SetRecord> for SetSummary {
    fn from(set: &SetRecord) -> Self {
        Self {
            set_number: set.set_number,
            score_a: set.score_a,
            score_b: set.score_b,
            status: set.status.to_string(),
            start_time: set.start_time,
            end_time: set.end_time,
            duration: set.duration,
            completed: set.is_completed(),
        }
    }
}

/// Live set with its serving team.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct CurrentSetSummary {
    /// The live set.
    pub set: SetSummary,
    /// `A` or `B`.
    pub serving_team: String,
}

impl From<&CurrentSet> for CurrentSetSummary {
    fn from(current: &CurrentSet) -> Self {
        Self {
            set: (&current.set).into(),
            serving_team: current.serving_team.to_string(),
        }
    }
}

/// Rule-derived indicators for the live score.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct RulesStatus {
    /// Points needed to win the live set.
    pub points_to_win: u32,
    /// Completed sets won by A.
    pub sets_won_a: u32,
    /// Completed sets won by B.
    pub sets_won_b: u32,
    /// Team holding setball.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setball: Option<String>,
    /// Team holding matchball.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchball: Option<String>,
    /// Winner once the match is decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_winner: Option<String>,
    /// Whether the live set can be finished now.
    pub can_finish_set: bool,
}

/// Full match state returned after every operation.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct MatchSnapshot {
    /// Match id.
    pub id: Uuid,
    /// Rule variant tag.
    pub variant: String,
    /// Home team.
    pub team_a: TeamSummary,
    /// Away team.
    pub team_b: TeamSummary,
    /// Completed sets in insertion order.
    pub sets: Vec<SetSummary>,
    /// The live set.
    pub current_set: CurrentSetSummary,
    /// Indicators derived from the variant rules.
    pub rules: RulesStatus,
    /// Number of actions that can be undone.
    pub history_size: usize,
    /// Last modification, epoch milliseconds.
    pub updated_at: i64,
    /// `updated_at` as RFC 3339.
    pub updated_at_iso: String,
}

impl From<&MatchSession> for MatchSnapshot {
    fn from(session: &MatchSession) -> Self {
        let game = session.snapshot();
        let rules = session.rules();
        let live = &game.current_set.set;
        let completed = game.completed_sets();
        let (sets_won_a, sets_won_b) = rules.set_wins(&completed);
        let in_progress = game.current_set.is_in_progress();

        let setball = in_progress
            .then(|| rules.setball(live.score_a, live.score_b, live.set_number))
            .flatten();
        let matchball = in_progress
            .then(|| rules.matchball(&completed, live.set_number, live.score_a, live.score_b))
            .flatten();

        Self {
            id: game.id,
            variant: game.variant.to_string(),
            team_a: (&game.team_a).into(),
            team_b: (&game.team_b).into(),
            sets: game.sets.iter().map(SetSummary::from).collect(),
            current_set: (&game.current_set).into(),
            rules: RulesStatus {
                points_to_win: rules.points_to_win(live.set_number),
                sets_won_a,
                sets_won_b,
                setball: setball.map(|team| team.to_string()),
                matchball: matchball.map(|team| team.to_string()),
                match_winner: rules.match_winner(&completed).map(|team| team.to_string()),
                can_finish_set: in_progress
                    && rules.can_finish_set(live.score_a, live.score_b, live.set_number),
            },
            history_size: session.history_size(),
            updated_at: game.updated_at,
            updated_at_iso: format_timestamp(game.updated_at),
        }
    }
}

/// Result of an undo request.
#[derive(Debug, Serialize, ToSchema)]
pub struct UndoResponse {
    /// False when the history was empty.
    pub undone: bool,
    /// Match after the undo.
    #[serde(rename = "match")]
    pub snapshot: MatchSnapshot,
}
