use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the engine answers.
    pub status: String,
    /// Rule variant of the loaded match.
    pub variant: String,
    /// Number of the live set.
    pub set_number: u32,
}

impl HealthResponse {
    /// Create a health response for the loaded match.
    pub fn ok(variant: impl Into<String>, set_number: u32) -> Self {
        Self {
            status: "ok".to_string(),
            variant: variant.into(),
            set_number,
        }
    }
}
