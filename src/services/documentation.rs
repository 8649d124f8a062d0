use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the match control API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoring::get_match,
        crate::routes::scoring::replace_match,
        crate::routes::scoring::change_score,
        crate::routes::scoring::change_serving_team,
        crate::routes::scoring::start_set,
        crate::routes::scoring::finish_set,
        crate::routes::scoring::update_set,
        crate::routes::scoring::undo,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::scoring::MatchSnapshot,
            crate::dto::scoring::ScoreChangeRequest,
            crate::dto::scoring::ServeChangeRequest,
            crate::dto::scoring::SetUpdateRequest,
            crate::dto::scoring::ReplaceMatchRequest,
            crate::dto::scoring::UndoResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "match", description = "Live match scoring and set editing"),
    )
)]
/// OpenAPI document of the control API.
pub struct ApiDoc;
