//! Business logic powering the match control routes. Each helper takes the
//! session lock, runs one engine operation and projects the result.

use tracing::debug;

use crate::{
    dto::scoring::{
        MatchSnapshot, ReplaceMatchRequest, ScoreChangeRequest, ServeChangeRequest,
        SetUpdateRequest, UndoResponse,
    },
    error::EngineError,
    state::{SharedState, match_state::TeamSide, update::SetUpdate},
};

pub async fn current_match(state: &SharedState) -> MatchSnapshot {
    let session = state.session().read().await;
    MatchSnapshot::from(&*session)
}

pub async fn change_score(
    state: &SharedState,
    request: ScoreChangeRequest,
) -> Result<MatchSnapshot, EngineError> {
    let team: TeamSide = request.team.parse()?;
    let mut session = state.session().write().await;
    session.change_score(team, request.delta)?;
    Ok(MatchSnapshot::from(&*session))
}

pub async fn change_serving_team(
    state: &SharedState,
    request: ServeChangeRequest,
) -> Result<MatchSnapshot, EngineError> {
    let team: TeamSide = request.team.parse()?;
    let mut session = state.session().write().await;
    session.change_serving_team(team)?;
    Ok(MatchSnapshot::from(&*session))
}

pub async fn start_set(state: &SharedState) -> Result<MatchSnapshot, EngineError> {
    let mut session = state.session().write().await;
    session.start_set()?;
    Ok(MatchSnapshot::from(&*session))
}

pub async fn finish_set(state: &SharedState) -> Result<MatchSnapshot, EngineError> {
    let mut session = state.session().write().await;
    session.finish_set()?;
    Ok(MatchSnapshot::from(&*session))
}

/// Apply a partial edit to set `set_number`, reopening it when requested.
pub async fn update_set(
    state: &SharedState,
    set_number: u32,
    request: SetUpdateRequest,
) -> Result<MatchSnapshot, EngineError> {
    let update = SetUpdate::try_from(request)?;
    let mut session = state.session().write().await;
    session.update_set(set_number, &update)?;
    Ok(MatchSnapshot::from(&*session))
}

pub async fn undo(state: &SharedState) -> UndoResponse {
    let mut session = state.session().write().await;
    let undone = session.undo();
    UndoResponse {
        undone,
        snapshot: MatchSnapshot::from(&*session),
    }
}

/// Replace the authoritative match with one pushed by another surface.
pub async fn replace_match(state: &SharedState, request: ReplaceMatchRequest) -> MatchSnapshot {
    let mut session = state.session().write().await;
    debug!(match_id = %request.snapshot.id, "replacing match from client");
    session.replace_match(request.snapshot);
    MatchSnapshot::from(&*session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn invalid_team_is_rejected_before_locking() {
        let state = AppState::new(AppConfig::default());
        start_set(&state).await.unwrap();

        let err = change_score(
            &state,
            ScoreChangeRequest {
                team: "C".into(),
                delta: 1,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, EngineError::InvalidTeam("C".into()));
        assert_eq!(current_match(&state).await.history_size, 1);
    }

    #[tokio::test]
    async fn scoring_round_trip_through_state() {
        let state = AppState::new(AppConfig::default());
        start_set(&state).await.unwrap();
        let snapshot = change_score(
            &state,
            ScoreChangeRequest {
                team: "B".into(),
                delta: 1,
            },
        )
        .await
        .unwrap();

        assert_eq!(snapshot.current_set.set.score_b, 1);
        assert_eq!(snapshot.current_set.serving_team, "B");

        let response = undo(&state).await;
        assert!(response.undone);
        assert_eq!(response.snapshot.current_set.set.score_b, 0);
    }
}
