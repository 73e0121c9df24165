//! Handlers for the auto-merge endpoints.

use axum::extract::{rejection::JsonRejection, Json, State};

use crate::api::auto_merge::types::{IntervalRequest, ToggleRequest};
use crate::api::error::ApiError;
use crate::api::types::MessageResponse;
use crate::scheduler::AutoMergeStatus;
use crate::service::MergeService;

/// POST /api/auto-merge
pub async fn set_enabled(
    State(service): State<MergeService>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    service.set_auto_merge(request.enabled);

    let message = if request.enabled {
        "Auto merge enabled"
    } else {
        "Auto merge disabled"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// GET /api/auto-merge/status
pub async fn status(State(service): State<MergeService>) -> Json<AutoMergeStatus> {
    Json(service.auto_merge_status())
}

/// POST /api/auto-merge/interval
///
/// Responds after the immediate merge-all cycle when auto-merge is enabled.
pub async fn set_interval(
    State(service): State<MergeService>,
    payload: Result<Json<IntervalRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    service.set_auto_merge_interval(request.interval).await?;
    Ok(Json(MessageResponse::new(format!(
        "Auto merge interval updated to {} minutes",
        request.interval
    ))))
}
