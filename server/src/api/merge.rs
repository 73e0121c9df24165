//! Manual merge endpoint.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    routing::post,
    Router,
};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::merge::MergeOutcome;
use crate::schedule::{BranchPair, ScheduleError};
use crate::service::MergeService;

/// Body of `POST /api/merge`.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    /// Branch merged from.
    #[serde(default)]
    pub source_branch: String,
    /// Branch merged into.
    #[serde(default)]
    pub target_branch: String,
}

impl MergeRequest {
    fn into_pair(self) -> Result<BranchPair, ScheduleError> {
        if self.source_branch.trim().is_empty() {
            return Err(ScheduleError::MissingField("source_branch"));
        }
        if self.target_branch.trim().is_empty() {
            return Err(ScheduleError::MissingField("target_branch"));
        }
        Ok(BranchPair::new(self.source_branch, self.target_branch))
    }
}

/// Manual merge route.
pub fn routes() -> Router<MergeService> {
    Router::new().route("/api/merge", post(merge_now))
}

/// POST /api/merge
///
/// Waits for any merge in flight, then runs this one. Git failures and
/// conflicts come back as an unsuccessful outcome with status 200.
pub async fn merge_now(
    State(service): State<MergeService>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<MergeOutcome>, ApiError> {
    let Json(request) = payload?;
    let pair = request.into_pair()?;
    Ok(Json(service.merge_now(&pair).await))
}
