use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness together with the loaded match variant and live set.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let session = state.session().read().await;
    let game = session.snapshot();
    HealthResponse::ok(game.variant.as_str(), game.current_set.set_number())
}
