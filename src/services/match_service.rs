//! Match session combining the score and set services with the undo ledger.
//! Every successful mutation records the previous snapshot so it can be undone;
//! failed operations leave both the match and the history untouched.

use std::{fmt, sync::Arc};

use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    error::EngineError,
    services::{score_service, set_service},
    state::{
        history::{Action, ActionKind, HistoryLedger},
        match_state::{Match, TeamSide, Timestamp},
        rules::RulesTable,
        update::SetUpdate,
    },
};

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Current timestamp.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as Timestamp
    }
}

/// The authoritative match of one editing session together with its history.
pub struct MatchSession {
    current: Match,
    history: HistoryLedger,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for MatchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchSession")
            .field("current", &self.current)
            .field("history_size", &self.history.history_size())
            .finish()
    }
}

impl MatchSession {
    /// Session over `current` with an empty ledger.
    pub fn new(current: Match, history: HistoryLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            current,
            history,
            clock,
        }
    }

    /// Session using the wall clock and default history limit.
    pub fn with_system_clock(current: Match) -> Self {
        Self::new(current, HistoryLedger::new(), Arc::new(SystemClock))
    }

    /// Current match snapshot.
    pub fn snapshot(&self) -> &Match {
        &self.current
    }

    /// Rules of the match variant.
    pub fn rules(&self) -> RulesTable {
        RulesTable::new(self.current.variant)
    }

    /// Undo ledger of this session.
    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Number of actions that can be undone.
    pub fn history_size(&self) -> usize {
        self.history.history_size()
    }

    /// Resize the ledger; `max_size` must be at least 1.
    pub fn set_max_history_size(&mut self, max_size: usize) -> Result<(), EngineError> {
        self.history.set_max_history_size(max_size)
    }

    /// Replace the whole match (last write wins). History no longer applies.
    pub fn replace_match(&mut self, next: Match) -> &Match {
        info!(match_id = %next.id, "match replaced; clearing history");
        self.history.clear();
        self.current = next;
        &self.current
    }

    /// Add `delta` points to `team`.
    pub fn change_score(&mut self, team: TeamSide, delta: i64) -> Result<&Match, EngineError> {
        let data = json!({ "team": team, "delta": delta });
        let now = self.clock.now();
        let next = score_service::change_score(&self.current, team, delta, now)
            .inspect_err(|err| warn!(error = %err, %team, delta, "score change rejected"))?;

        debug!(
            %team,
            delta,
            score_a = next.current_set.set.score_a,
            score_b = next.current_set.set.score_b,
            "score changed"
        );
        Ok(self.commit(ActionKind::ChangeScore, data, next, now))
    }

    /// Correct the serving team. A no-op is not recorded in history.
    pub fn change_serving_team(&mut self, team: TeamSide) -> Result<&Match, EngineError> {
        let now = self.clock.now();
        let change = score_service::change_serving_team(&self.current, team, now)
            .inspect_err(|err| warn!(error = %err, %team, "serve change rejected"))?;

        if !change.changed {
            debug!(%team, "team already serving");
            return Ok(&self.current);
        }

        debug!(%team, "serving team changed");
        let data = json!({ "team": team });
        Ok(self.commit(ActionKind::ChangeServingTeam, data, change.next, now))
    }

    /// Start the next set.
    pub fn start_set(&mut self) -> Result<&Match, EngineError> {
        let now = self.clock.now();
        let next = set_service::start_set(&self.current, now)
            .inspect_err(|err| warn!(error = %err, "start set rejected"))?;

        let set_number = next.current_set.set_number();
        info!(set_number, "set started");
        Ok(self.commit(
            ActionKind::StartSet,
            json!({ "set_number": set_number }),
            next,
            now,
        ))
    }

    /// Finish the live set and archive it.
    pub fn finish_set(&mut self) -> Result<&Match, EngineError> {
        let now = self.clock.now();
        let next = set_service::finish_set(&self.current, now)
            .inspect_err(|err| warn!(error = %err, "finish set rejected"))?;

        let set = &self.current.current_set.set;
        info!(
            set_number = set.set_number,
            score_a = set.score_a,
            score_b = set.score_b,
            "set finished"
        );
        let data = json!({
            "set_number": set.set_number,
            "score_a": set.score_a,
            "score_b": set.score_b,
        });
        Ok(self.commit(ActionKind::FinishSet, data, next, now))
    }

    /// Edit any set, reopening it when the update asks for it.
    pub fn update_set(
        &mut self,
        set_number: u32,
        update: &SetUpdate,
    ) -> Result<&Match, EngineError> {
        let now = self.clock.now();
        let next = set_service::update_set(&self.current, set_number, update, now)
            .inspect_err(|err| warn!(error = %err, set_number, "set update rejected"))?;

        let reopened = self.current.find_completed_set(set_number).is_some()
            && next.find_completed_set(set_number).is_none();
        if reopened {
            info!(set_number, "set reopened");
        } else {
            info!(set_number, "set updated");
        }

        let data = json!({
            "set_number": set_number,
            "status": update.status,
            "reopened": reopened,
        });
        Ok(self.commit(ActionKind::UpdateSet, data, next, now))
    }

    /// Restore the state before the last action. Team logos are kept as they
    /// are now. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.history.undo_last_action() else {
            debug!("nothing to undo");
            return false;
        };

        let mut restored = action.previous_state;
        restored.team_a.logo = self.current.team_a.logo.clone();
        restored.team_b.logo = self.current.team_b.logo.clone();
        self.current = restored;

        info!(
            kind = ?action.kind,
            remaining = self.history.history_size(),
            "action undone"
        );
        true
    }

    fn commit(
        &mut self,
        kind: ActionKind,
        data: serde_json::Value,
        next: Match,
        now: Timestamp,
    ) -> &Match {
        let previous_state = std::mem::replace(&mut self.current, next);
        self.history.add_action(Action {
            kind,
            timestamp: now,
            data,
            previous_state,
        });
        &self.current
    }
}
