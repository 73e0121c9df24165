//! Error responses shared by every endpoint.

use axum::{
    extract::{rejection::JsonRejection, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::infrastructure::storage::StorageError;
use crate::schedule::ScheduleError;
use crate::scheduler::AutoMergeError;
use crate::vcs::VcsError;

/// Body returned for a rejected time value.
pub const INVALID_TIME_MESSAGE: &str = "Invalid time format. Please use HH:MM format";
/// Body returned for an unknown job id.
pub const NOT_FOUND_MESSAGE: &str = "Configuration not found";

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Job validation or lookup failure.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    /// Auto-merge setting rejected.
    #[error(transparent)]
    AutoMerge(#[from] AutoMergeError),
    /// git failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
    /// A settings file could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The request body was not valid JSON for the endpoint.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Schedule(ScheduleError::InvalidTimeFormat(_)) => "invalid_time_format",
            ApiError::Schedule(ScheduleError::MissingField(_)) => "missing_field",
            ApiError::Schedule(ScheduleError::NotFound(_)) => "not_found",
            ApiError::AutoMerge(AutoMergeError::InvalidInterval(_)) => "invalid_interval",
            ApiError::Vcs(_) => "vcs_failure",
            ApiError::Storage(_) => "persistence_failure",
            ApiError::InvalidBody(_) => "invalid_body",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Schedule(ScheduleError::InvalidTimeFormat(_)) => {
                (StatusCode::BAD_REQUEST, INVALID_TIME_MESSAGE.to_string())
            }
            ApiError::Schedule(ScheduleError::MissingField(field)) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required field: {field}"),
            ),
            ApiError::Schedule(ScheduleError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string())
            }
            ApiError::AutoMerge(AutoMergeError::InvalidInterval(_)) => (
                StatusCode::BAD_REQUEST,
                "Interval must be at least 1 minute".to_string(),
            ),
            ApiError::Vcs(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "Failed to persist settings");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save settings".to_string(),
                )
            }
            ApiError::InvalidBody(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "message": message,
            "error_type": self.error_type(),
        }));

        (status, body).into_response()
    }
}
