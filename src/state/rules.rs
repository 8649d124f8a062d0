//! Per-variant rule constants and the predicates derived from them.
//!
//! Scores are never capped: once both teams sit one point below the target the
//! set continues until someone leads by two.

use serde::Serialize;

use crate::state::match_state::{SetRecord, SetStatus, TeamSide, Variant};

/// Immutable rule constants for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RulesConfig {
    /// Set wins that take the match.
    pub sets_to_win_match: u32,
    /// Upper bound on sets played.
    pub max_sets: u32,
    /// Finish threshold of a regular set.
    pub points_to_win_regular_set: u32,
    /// Finish threshold of the deciding set.
    pub points_to_win_deciding_set: u32,
    /// Number of the final, shorter set.
    pub deciding_set_number: u32,
    /// Leading score from which a regular set is at setball.
    pub setball_threshold_regular: u32,
    /// Same threshold for the deciding set.
    pub setball_threshold_deciding: u32,
}

const INDOOR: RulesConfig = RulesConfig {
    sets_to_win_match: 3,
    max_sets: 5,
    points_to_win_regular_set: 25,
    points_to_win_deciding_set: 15,
    deciding_set_number: 5,
    setball_threshold_regular: 24,
    setball_threshold_deciding: 14,
};

const BEACH: RulesConfig = RulesConfig {
    sets_to_win_match: 2,
    max_sets: 3,
    points_to_win_regular_set: 21,
    points_to_win_deciding_set: 15,
    deciding_set_number: 3,
    setball_threshold_regular: 20,
    setball_threshold_deciding: 14,
};

const SNOW: RulesConfig = RulesConfig {
    sets_to_win_match: 2,
    max_sets: 3,
    points_to_win_regular_set: 15,
    points_to_win_deciding_set: 15,
    deciding_set_number: 3,
    setball_threshold_regular: 14,
    setball_threshold_deciding: 14,
};

impl RulesConfig {
    /// Constants for `variant`.
    pub fn for_variant(variant: Variant) -> &'static RulesConfig {
        match variant {
            Variant::Indoor => &INDOOR,
            Variant::Beach => &BEACH,
            Variant::Snow => &SNOW,
        }
    }
}

/// Rule predicates bound to one variant.
#[derive(Debug, Clone, Copy)]
pub struct RulesTable {
    variant: Variant,
    config: &'static RulesConfig,
}

impl RulesTable {
    /// Rules for `variant`.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            config: RulesConfig::for_variant(variant),
        }
    }

    /// Variant these rules belong to.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Constants backing this table.
    pub fn config(&self) -> &'static RulesConfig {
        self.config
    }

    /// Whether `set_number` is the deciding set.
    pub fn is_deciding_set(&self, set_number: u32) -> bool {
        set_number == self.config.deciding_set_number
    }

    /// Points needed to win set `set_number` (before any deuce extension).
    pub fn points_to_win(&self, set_number: u32) -> u32 {
        if self.is_deciding_set(set_number) {
            self.config.points_to_win_deciding_set
        } else {
            self.config.points_to_win_regular_set
        }
    }

    fn setball_threshold(&self, set_number: u32) -> u32 {
        if self.is_deciding_set(set_number) {
            self.config.setball_threshold_deciding
        } else {
            self.config.setball_threshold_regular
        }
    }

    /// Team holding setball, if any.
    pub fn setball(&self, score_a: u32, score_b: u32, set_number: u32) -> Option<TeamSide> {
        let leader = self.set_winner(score_a, score_b)?;
        let leading = score_a.max(score_b);
        (leading >= self.setball_threshold(set_number)).then_some(leader)
    }

    /// Shorthand for [`Self::setball`]`.is_some()`.
    pub fn is_setball(&self, score_a: u32, score_b: u32, set_number: u32) -> bool {
        self.setball(score_a, score_b, set_number).is_some()
    }

    /// Whether the score allows the set to be closed.
    pub fn can_finish_set(&self, score_a: u32, score_b: u32, set_number: u32) -> bool {
        let target = self.points_to_win(set_number);
        let leading = score_a.max(score_b);
        let trailing = score_a.min(score_b);
        let lead = leading - trailing;

        if leading >= target && lead >= 2 {
            return true;
        }

        trailing >= target.saturating_sub(1) && lead >= 2
    }

    /// Team holding matchball: one set away from the match and on setball.
    pub fn matchball(
        &self,
        completed_sets: &[SetRecord],
        current_set_number: u32,
        score_a: u32,
        score_b: u32,
    ) -> Option<TeamSide> {
        let setball_team = self.setball(score_a, score_b, current_set_number)?;
        let (wins_a, wins_b) = self.set_wins(completed_sets);
        let needed = self.config.sets_to_win_match.saturating_sub(1);
        let wins = match setball_team {
            TeamSide::A => wins_a,
            TeamSide::B => wins_b,
        };

        (wins == needed).then_some(setball_team)
    }

    /// Shorthand for [`Self::matchball`]`.is_some()`.
    pub fn is_matchball(
        &self,
        completed_sets: &[SetRecord],
        current_set_number: u32,
        score_a: u32,
        score_b: u32,
    ) -> bool {
        self.matchball(completed_sets, current_set_number, score_a, score_b)
            .is_some()
    }

    /// Strict leader of a score, `None` on a tie.
    pub fn set_winner(&self, score_a: u32, score_b: u32) -> Option<TeamSide> {
        match score_a.cmp(&score_b) {
            std::cmp::Ordering::Greater => Some(TeamSide::A),
            std::cmp::Ordering::Less => Some(TeamSide::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Sets won by each team among completed records.
    pub fn set_wins(&self, sets: &[SetRecord]) -> (u32, u32) {
        sets.iter()
            .filter(|set| set.status == SetStatus::Completed)
            .fold((0, 0), |(a, b), set| {
                match self.set_winner(set.score_a, set.score_b) {
                    Some(TeamSide::A) => (a + 1, b),
                    Some(TeamSide::B) => (a, b + 1),
                    None => (a, b),
                }
            })
    }

    /// First team to reach the required number of set wins.
    pub fn match_winner(&self, sets: &[SetRecord]) -> Option<TeamSide> {
        let target = self.config.sets_to_win_match;
        let (mut wins_a, mut wins_b) = (0, 0);

        for set in sets.iter().filter(|set| set.status == SetStatus::Completed) {
            match self.set_winner(set.score_a, set.score_b) {
                Some(TeamSide::A) => wins_a += 1,
                Some(TeamSide::B) => wins_b += 1,
                None => continue,
            }
            if wins_a >= target {
                return Some(TeamSide::A);
            }
            if wins_b >= target {
                return Some(TeamSide::B);
            }
        }

        None
    }

    /// A team has reached the set wins needed.
    pub fn is_match_finished(&self, sets: &[SetRecord]) -> bool {
        self.match_winner(sets).is_some()
    }
}
