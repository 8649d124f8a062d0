/// Undo ledger.
pub mod history;
/// Match aggregate and its records.
pub mod match_state;
/// Variant rules.
pub mod rules;
/// Set status automaton.
pub mod state_machine;
/// Partial set edits.
pub mod update;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    config::AppConfig,
    services::match_service::{Clock, MatchSession, SystemClock},
    state::match_state::Match,
};

/// Handle shared by every route.
pub type SharedState = Arc<AppState>;

/// Central application state: the single authoritative match session.
///
/// Concurrent callers (desktop and mobile) are serialized through the lock;
/// the last write replaces the current match.
pub struct AppState {
    session: RwLock<MatchSession>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// A fresh match is created from the configured variant and team names.
    pub fn new(config: AppConfig) -> SharedState {
        let session = MatchSession::with_system_clock(Match::new(
            config.variant,
            config.team_a.clone(),
            config.team_b.clone(),
            SystemClock.now(),
        ));
        Self::with_session(&config, session)
    }

    /// Wrap an existing session, applying the configured history limit.
    pub fn with_session(config: &AppConfig, mut session: MatchSession) -> SharedState {
        if let Err(err) = session.set_max_history_size(config.max_history_size) {
            warn!(error = %err, "ignoring configured history size");
        }
        Arc::new(Self {
            session: RwLock::new(session),
        })
    }

    /// Lock guarding the match session.
    pub fn session(&self) -> &RwLock<MatchSession> {
        &self.session
    }
}
