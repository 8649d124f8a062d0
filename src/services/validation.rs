//! Time interval checks and validation of proposed set edits.
//!
//! Rules run in a fixed order so the collected messages are stable.

use crate::{
    error::EngineError,
    state::{
        match_state::{Match, SetRecord, SetStatus, Timestamp},
        rules::RulesTable,
        state_machine::{SetStateMachine, TransitionContext},
        update::{FieldUpdate, SetUpdate},
    },
};

/// Possibly open-ended time range of a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeInterval {
    /// Start, epoch milliseconds.
    pub start: Option<Timestamp>,
    /// End, epoch milliseconds.
    pub end: Option<Timestamp>,
}

impl TimeInterval {
    /// Interval from raw bounds.
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Self { start, end }
    }

    /// Interval covered by a set record.
    pub fn of(set: &SetRecord) -> Self {
        Self::new(set.start_time, set.end_time)
    }

    /// Both bounds are known.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// An interval is valid when a bound is missing or it does not run backwards.
    pub fn is_valid(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
        }
    }

    /// Whether two complete intervals share time. Touching endpoints do not.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        match (self.start, self.end, other.start, other.end) {
            (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => {
                !(a_end <= b_start || b_end <= a_start)
            }
            _ => false,
        }
    }

    /// `self` does not start before `previous` ended.
    pub fn follows(&self, previous: &TimeInterval) -> bool {
        match (self.start, previous.end) {
            (Some(start), Some(previous_end)) => start >= previous_end,
            _ => true,
        }
    }

    /// `self` does not end after `next` started.
    pub fn precedes(&self, next: &TimeInterval) -> bool {
        match (self.end, next.start) {
            (Some(end), Some(next_start)) => end <= next_start,
            _ => true,
        }
    }
}

/// Outcome of validating a set edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Messages in rule order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// No rule was violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn the report into an engine error carrying every message.
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::ValidationFailed(self.errors))
        }
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Whether a set after `set_number` already exists or is being played.
pub fn has_next_set(game: &Match, set_number: u32) -> bool {
    game.sets.iter().any(|set| set.set_number > set_number)
        || (game.current_set.is_in_progress() && game.current_set.set_number() > set_number)
}

/// Validate `update` layered over `base`, which is set `base.set_number` of `game`.
pub fn validate_set_update(game: &Match, base: &SetRecord, update: &SetUpdate) -> ValidationReport {
    let mut report = ValidationReport::default();
    let rules = RulesTable::new(game.variant);
    let set_number = base.set_number;

    let (score_a, score_b) = update.final_scores(base);
    let status = update.final_status(base);
    let (start, end) = update.final_times(base);
    let interval = TimeInterval::new(start, end);

    for (team, score) in [("A", score_a), ("B", score_b)] {
        if score < 0 {
            report.push(format!("Score for team {team} cannot be negative"));
        } else if score > i64::from(u32::MAX) {
            report.push(format!("Score for team {team} cannot exceed {}", u32::MAX));
        }
    }

    if status != base.status {
        let context = TransitionContext {
            has_next_set: has_next_set(game, set_number),
        };
        if let Err(err) = SetStateMachine::transition(base.status, status, context) {
            report.push(err.to_string());
        }
    }

    if !interval.is_valid() {
        report.push("End time must not be before start time");
    }

    if status == SetStatus::Completed {
        let finishable = match (u32::try_from(score_a), u32::try_from(score_b)) {
            (Ok(a), Ok(b)) => rules.can_finish_set(a, b, set_number),
            _ => false,
        };
        if !finishable {
            report.push(format!(
                "Set {set_number} cannot be completed with score {score_a}-{score_b}: a team needs at least {} points with a 2-point lead",
                rules.points_to_win(set_number)
            ));
        }

        if !interval.is_complete() {
            report.push("A completed set requires both a start and an end time");
        }
    }

    if base.status == SetStatus::Completed
        && status == SetStatus::InProgress
        && !update.end_time.is_clear()
    {
        report.push("Reopening a completed set requires clearing its end time");
    }

    if status != SetStatus::Completed && matches!(update.end_time, FieldUpdate::Set(_)) {
        report.push("Only a completed set can have an end time");
    }

    if status == SetStatus::Completed && interval.is_complete() {
        check_neighbours(game, set_number, &interval, &mut report);
    }

    report
}

fn check_neighbours(
    game: &Match,
    set_number: u32,
    interval: &TimeInterval,
    report: &mut ValidationReport,
) {
    let previous = game
        .sets
        .iter()
        .filter(|set| set.set_number < set_number)
        .max_by_key(|set| set.set_number);

    if let Some(previous) = previous {
        let other = TimeInterval::of(previous);
        if interval.overlaps(&other) {
            report.push(format!(
                "Set {set_number} overlaps with set {}",
                previous.set_number
            ));
        } else if !interval.follows(&other) {
            report.push(format!(
                "Set {set_number} cannot start before set {} ended",
                previous.set_number
            ));
        }
    }

    let next = game
        .sets
        .iter()
        .filter(|set| set.set_number > set_number)
        .min_by_key(|set| set.set_number)
        .or_else(|| {
            let current = &game.current_set;
            (current.set_number() > set_number && current.set.start_time.is_some())
                .then_some(&current.set)
        });

    if let Some(next) = next {
        let other = TimeInterval::of(next);
        if interval.overlaps(&other) {
            report.push(format!(
                "Set {set_number} overlaps with set {}",
                next.set_number
            ));
        } else if !interval.precedes(&other) {
            report.push(format!(
                "Set {set_number} cannot end after set {} started",
                next.set_number
            ));
        }
    }
}
