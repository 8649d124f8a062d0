use thiserror::Error;

use crate::state::match_state::{SetRecord, SetStatus};

/// Facts about the rest of the match needed to judge a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionContext {
    /// A later set already exists or is being played.
    pub has_next_set: bool,
}

/// Error returned when a set status change is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot change set status from {from} to {to}")]
pub struct InvalidTransition {
    /// Status the set is in.
    pub from: SetStatus,
    /// Requested status.
    pub to: SetStatus,
}

/// Timestamps wiped when a set enters a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeClearing {
    /// Drop the start time.
    pub start: bool,
    /// Drop the end time and duration.
    pub end: bool,
}

/// Lifecycle automaton of a single set.
///
/// `pending -> in_progress -> completed`, with `in_progress -> pending` as a
/// cancel and `completed -> in_progress` as a reopen guarded by the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetStateMachine;

impl SetStateMachine {
    /// Whether moving from `from` to `to` is legal.
    pub fn can_transition(from: SetStatus, to: SetStatus, context: TransitionContext) -> bool {
        match (from, to) {
            (SetStatus::Pending, SetStatus::InProgress) => true,
            (SetStatus::InProgress, SetStatus::Completed) => true,
            (SetStatus::InProgress, SetStatus::Pending) => true,
            (SetStatus::Completed, SetStatus::InProgress) => !context.has_next_set,
            (SetStatus::Completed, SetStatus::Completed) => true,
            _ => false,
        }
    }

    /// Validate a transition, returning the target status.
    pub fn transition(
        from: SetStatus,
        to: SetStatus,
        context: TransitionContext,
    ) -> Result<SetStatus, InvalidTransition> {
        if Self::can_transition(from, to, context) {
            Ok(to)
        } else {
            Err(InvalidTransition { from, to })
        }
    }

    /// Next statuses offered to the operator for a set in `from`.
    ///
    /// A completed set that cannot be reopened offers itself as a no-op stay.
    pub fn available_transitions(from: SetStatus, context: TransitionContext) -> Vec<SetStatus> {
        match from {
            SetStatus::Pending => vec![SetStatus::InProgress],
            SetStatus::InProgress => vec![SetStatus::Completed, SetStatus::Pending],
            SetStatus::Completed if context.has_next_set => vec![SetStatus::Completed],
            SetStatus::Completed => vec![SetStatus::InProgress],
        }
    }

    /// Which timestamps must be dropped when a set enters `to`.
    pub fn time_clearing(to: SetStatus) -> TimeClearing {
        match to {
            SetStatus::Pending => TimeClearing {
                start: true,
                end: true,
            },
            SetStatus::InProgress => TimeClearing {
                start: false,
                end: true,
            },
            SetStatus::Completed => TimeClearing {
                start: false,
                end: false,
            },
        }
    }

    /// Apply [`Self::time_clearing`] to a record entering `to`.
    pub fn clear_times(record: &mut SetRecord, to: SetStatus) {
        let clearing = Self::time_clearing(to);
        if clearing.start {
            record.start_time = None;
        }
        if clearing.end {
            record.end_time = None;
            record.duration = None;
        }
    }
}
