use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::state_machine::InvalidTransition;

/// Errors raised by the scoring engine. The message is the caller-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Team argument outside of `A`/`B`.
    #[error("Invalid team `{0}`: must be 'A' or 'B'")]
    InvalidTeam(String),
    /// Score delta outside of `+1`/`-1`.
    #[error("Invalid score delta {0}: must be +1 or -1")]
    InvalidDelta(i64),
    /// Score or serve change while no set is being played.
    #[error("Set has not started")]
    SetNotStarted,
    /// `start_set` while the live set is not pending.
    #[error("Set is already in progress or finished")]
    SetAlreadyActiveOrFinished,
    /// `finish_set` with a score that does not close the set.
    #[error(
        "Set cannot be finished: a team needs at least {required} points with a 2-point lead"
    )]
    SetNotFinishable {
        /// Points the winning team needs to reach.
        required: u32,
    },
    /// No set carries the requested number.
    #[error("Set {0} not found")]
    SetNotFound(u32),
    /// One or more set update rules were violated.
    #[error("{}", .0.join("; "))]
    ValidationFailed(Vec<String>),
    /// History limit below one.
    #[error("History size must be at least 1 (got {0})")]
    InvalidHistorySize(usize),
}

impl From<InvalidTransition> for EngineError {
    fn from(err: InvalidTransition) -> Self {
        EngineError::ValidationFailed(vec![err.to_string()])
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Adapter-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Operation not allowed in the current set state.
    #[error("{0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::InvalidTeam(_)
            | EngineError::InvalidDelta(_)
            | EngineError::SetNotFinishable { .. }
            | EngineError::ValidationFailed(_)
            | EngineError::InvalidHistorySize(_) => AppError::BadRequest(message),
            EngineError::SetNotStarted | EngineError::SetAlreadyActiveOrFinished => {
                AppError::Forbidden(message)
            }
            EngineError::SetNotFound(_) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
