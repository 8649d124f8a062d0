//! Bounded linear undo stack.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    state::match_state::{Match, Timestamp},
};

/// Number of actions kept when no limit is configured.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 100;

/// Kind of mutation recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Point added or removed.
    ChangeScore,
    /// Serve corrected.
    ChangeServingTeam,
    /// Set started.
    StartSet,
    /// Set finished.
    FinishSet,
    /// Retroactive set edit, including reopen.
    UpdateSet,
}

/// One undoable mutation with the match as it was before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// What was done.
    pub kind: ActionKind,
    /// When the action was recorded.
    pub timestamp: Timestamp,
    /// Free-form payload describing the intent.
    pub data: serde_json::Value,
    /// Match before the action ran.
    pub previous_state: Match,
}

/// Owned undo ledger; oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    actions: VecDeque<Action>,
    max_size: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self {
            actions: VecDeque::new(),
            max_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

impl HistoryLedger {
    /// Ledger with the default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger bounded to `max_size` entries.
    pub fn with_max_size(max_size: usize) -> Result<Self, EngineError> {
        let mut ledger = Self::new();
        ledger.set_max_history_size(max_size)?;
        Ok(ledger)
    }

    /// Record an action, evicting from the front when over the limit.
    pub fn add_action(&mut self, action: Action) {
        self.actions.push_back(action);
        self.truncate();
    }

    /// Pop the most recent action.
    pub fn undo_last_action(&mut self) -> Option<Action> {
        self.actions.pop_back()
    }

    /// Most recent action, left in place.
    pub fn last_action(&self) -> Option<&Action> {
        self.actions.back()
    }

    /// Copy of every entry, oldest first.
    pub fn history(&self) -> Vec<Action> {
        self.actions.iter().cloned().collect()
    }

    /// Number of recorded actions.
    pub fn history_size(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing can be undone.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Capacity before the oldest entries are evicted.
    pub fn max_history_size(&self) -> usize {
        self.max_size
    }

    /// Change the limit, dropping the oldest entries if the ledger shrinks.
    pub fn set_max_history_size(&mut self, max_size: usize) -> Result<(), EngineError> {
        if max_size < 1 {
            return Err(EngineError::InvalidHistorySize(max_size));
        }
        self.max_size = max_size;
        self.truncate();
        Ok(())
    }

    /// Forget every recorded action.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    fn truncate(&mut self) {
        while self.actions.len() > self.max_size {
            self.actions.pop_front();
        }
    }
}
