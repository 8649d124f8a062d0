use crate::state::match_state::{SetRecord, SetStatus, Timestamp};

/// Three-state edit of an optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Keep the current value.
    #[default]
    Unchanged,
    /// Remove the value.
    Clear,
    /// Replace the value.
    Set(T),
}

impl<T: Copy> FieldUpdate<T> {
    /// Layer this edit over `current`.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Unchanged => current,
            FieldUpdate::Clear => None,
            FieldUpdate::Set(value) => Some(value),
        }
    }

    /// Whether this edit keeps the value.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// Whether this edit removes the value.
    pub fn is_clear(&self) -> bool {
        matches!(self, FieldUpdate::Clear)
    }
}

impl<T> From<Option<Option<T>>> for FieldUpdate<T> {
    /// Maps JSON "absent / null / value" onto the three states.
    fn from(value: Option<Option<T>>) -> Self {
        match value {
            None => FieldUpdate::Unchanged,
            Some(None) => FieldUpdate::Clear,
            Some(Some(value)) => FieldUpdate::Set(value),
        }
    }
}

/// Partial edit of a set, applied by `update_set`.
///
/// Scores are signed so that negative input reaches the validator and is
/// reported instead of being silently wrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetUpdate {
    /// Replacement score for team A.
    pub score_a: Option<i64>,
    /// Replacement score for team B.
    pub score_b: Option<i64>,
    /// Target status, if changing.
    pub status: Option<SetStatus>,
    /// Start time edit.
    pub start_time: FieldUpdate<Timestamp>,
    /// End time edit.
    pub end_time: FieldUpdate<Timestamp>,
}

impl SetUpdate {
    /// Update that reopens a completed set.
    pub fn reopen() -> Self {
        Self {
            status: Some(SetStatus::InProgress),
            end_time: FieldUpdate::Clear,
            ..Self::default()
        }
    }

    /// Whether either timestamp is touched.
    pub fn touches_times(&self) -> bool {
        !self.start_time.is_unchanged() || !self.end_time.is_unchanged()
    }

    /// Resulting status once layered over `base`.
    pub fn final_status(&self, base: &SetRecord) -> SetStatus {
        self.status.unwrap_or(base.status)
    }

    /// Resulting scores once layered over `base`, before any range check.
    pub fn final_scores(&self, base: &SetRecord) -> (i64, i64) {
        (
            self.score_a.unwrap_or(i64::from(base.score_a)),
            self.score_b.unwrap_or(i64::from(base.score_b)),
        )
    }

    /// Resulting `(start, end)` once layered over `base`.
    pub fn final_times(&self, base: &SetRecord) -> (Option<Timestamp>, Option<Timestamp>) {
        (
            self.start_time.apply(base.start_time),
            self.end_time.apply(base.end_time),
        )
    }
}
