//! Branch listing endpoints.

use axum::{
    extract::{Json, State},
    routing::get,
    Router,
};

use crate::api::error::ApiError;
use crate::service::MergeService;

/// Local and remote branch listing.
pub fn routes() -> Router<MergeService> {
    Router::new()
        .route("/api/branches", get(list_local))
        .route("/api/branches/remote", get(list_remote))
}

/// GET /api/branches
pub async fn list_local(
    State(service): State<MergeService>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(service.local_branches().await?))
}

/// GET /api/branches/remote
///
/// Fetches first; branches on the default remote are listed without prefix.
pub async fn list_remote(
    State(service): State<MergeService>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(service.remote_branches().await?))
}
