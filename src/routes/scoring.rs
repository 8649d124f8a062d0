use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::scoring::{
        MatchSnapshot, ReplaceMatchRequest, ScoreChangeRequest, ServeChangeRequest,
        SetUpdateRequest, UndoResponse,
    },
    error::AppError,
    services::control_service,
    state::SharedState,
};

/// Routes driving the live match: scoring, set lifecycle, edits and undo.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/match", get(get_match).put(replace_match))
        .route("/match/score", post(change_score))
        .route("/match/serve", post(change_serving_team))
        .route("/match/sets/start", post(start_set))
        .route("/match/sets/finish", post(finish_set))
        .route("/match/sets/{set_number}", put(update_set))
        .route("/match/undo", post(undo))
}

/// Current match snapshot with rule indicators.
#[utoipa::path(
    get,
    path = "/match",
    tag = "match",
    responses((status = 200, description = "Current match", body = MatchSnapshot))
)]
pub async fn get_match(State(state): State<SharedState>) -> Json<MatchSnapshot> {
    Json(control_service::current_match(&state).await)
}

/// Replace the whole match; the last write wins and history is cleared.
#[utoipa::path(
    put,
    path = "/match",
    tag = "match",
    request_body = ReplaceMatchRequest,
    responses((status = 200, description = "Match replaced", body = MatchSnapshot))
)]
pub async fn replace_match(
    State(state): State<SharedState>,
    Json(payload): Json<ReplaceMatchRequest>,
) -> Json<MatchSnapshot> {
    Json(control_service::replace_match(&state, payload).await)
}

/// Add or remove one point for a team.
#[utoipa::path(
    post,
    path = "/match/score",
    tag = "match",
    request_body = ScoreChangeRequest,
    responses(
        (status = 200, description = "Score changed", body = MatchSnapshot),
        (status = 400, description = "Invalid team or delta"),
        (status = 403, description = "Set has not started")
    )
)]
pub async fn change_score(
    State(state): State<SharedState>,
    Json(payload): Json<ScoreChangeRequest>,
) -> Result<Json<MatchSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(control_service::change_score(&state, payload).await?))
}

/// Correct which team is serving.
#[utoipa::path(
    post,
    path = "/match/serve",
    tag = "match",
    request_body = ServeChangeRequest,
    responses(
        (status = 200, description = "Serving team set", body = MatchSnapshot),
        (status = 400, description = "Invalid team"),
        (status = 403, description = "Set has not started")
    )
)]
pub async fn change_serving_team(
    State(state): State<SharedState>,
    Json(payload): Json<ServeChangeRequest>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(
        control_service::change_serving_team(&state, payload).await?,
    ))
}

/// Start the next set.
#[utoipa::path(
    post,
    path = "/match/sets/start",
    tag = "match",
    responses(
        (status = 200, description = "Set started", body = MatchSnapshot),
        (status = 403, description = "Set already in progress or finished")
    )
)]
pub async fn start_set(
    State(state): State<SharedState>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(control_service::start_set(&state).await?))
}

/// Finish the live set.
#[utoipa::path(
    post,
    path = "/match/sets/finish",
    tag = "match",
    responses(
        (status = 200, description = "Set finished", body = MatchSnapshot),
        (status = 400, description = "Score does not close the set"),
        (status = 403, description = "Set has not started")
    )
)]
pub async fn finish_set(
    State(state): State<SharedState>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(control_service::finish_set(&state).await?))
}

/// Edit any set. Setting `status` to `in_progress` with `end_time: null` reopens a completed set.
#[utoipa::path(
    put,
    path = "/match/sets/{set_number}",
    tag = "match",
    params(("set_number" = u32, Path, description = "Number of the set to edit")),
    request_body = SetUpdateRequest,
    responses(
        (status = 200, description = "Set updated", body = MatchSnapshot),
        (status = 400, description = "Update violates set rules"),
        (status = 404, description = "Set not found")
    )
)]
pub async fn update_set(
    State(state): State<SharedState>,
    Path(set_number): Path<u32>,
    Json(payload): Json<SetUpdateRequest>,
) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(
        control_service::update_set(&state, set_number, payload).await?,
    ))
}

/// Undo the last recorded action.
#[utoipa::path(
    post,
    path = "/match/undo",
    tag = "match",
    responses((status = 200, description = "Undo result", body = UndoResponse))
)]
pub async fn undo(State(state): State<SharedState>) -> Json<UndoResponse> {
    Json(control_service::undo(&state).await)
}
