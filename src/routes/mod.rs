use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Liveness probe.
pub mod health;
/// Match control endpoints.
pub mod scoring;

/// Compose all route trees and attach the shared match state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(scoring::router())
        .merge(docs::router())
        .with_state(state)
}
