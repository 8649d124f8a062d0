/// Adapter helpers behind the match control routes.
pub mod control_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Match session with undo history.
pub mod match_service;
/// Point and serve mutations.
pub mod score_service;
/// Set start, finish, edit and reopen.
pub mod set_service;
/// Time interval and set update validation.
pub mod validation;
