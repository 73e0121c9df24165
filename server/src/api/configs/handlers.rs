//! Handlers for `/api/configs`.

use axum::extract::{rejection::JsonRejection, Json, Path, State};

use crate::api::error::ApiError;
use crate::api::types::MessageResponse;
use crate::schedule::{JobId, MergeJob, NewMergeJob};
use crate::service::MergeService;

/// GET /api/configs
pub async fn list_configs(State(service): State<MergeService>) -> Json<Vec<MergeJob>> {
    Json(service.jobs())
}

/// POST /api/configs
///
/// Registers a daily merge. Unknown fields are kept with the job.
pub async fn add_config(
    State(service): State<MergeService>,
    payload: Result<Json<NewMergeJob>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(submitted) = payload?;
    service.add_job(submitted)?;
    Ok(Json(MessageResponse::new("Configuration added successfully")))
}

/// DELETE /api/configs/{id}
pub async fn delete_config(
    State(service): State<MergeService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.remove_job(&JobId::from(id))?;
    Ok(Json(MessageResponse::new(
        "Configuration deleted successfully",
    )))
}
