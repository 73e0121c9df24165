//! Build trigger settings and manual trigger endpoints.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::MessageResponse;
use crate::build::{BuildSettingsUpdate, BuildSettingsView, BuildTriggerError};
use crate::service::MergeService;

/// Result of `POST /api/trigger-jenkins`.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerResponse {
    /// Whether the build server accepted the request.
    pub success: bool,
    /// Human-readable result.
    pub message: String,
}

/// Settings and manual trigger routes.
pub fn routes() -> Router<MergeService> {
    Router::new()
        .route("/api/settings", get(get_settings).post(save_settings))
        .route("/api/trigger-jenkins", post(trigger_build))
}

/// GET /api/settings
///
/// The token is masked.
pub async fn get_settings(State(service): State<MergeService>) -> Json<BuildSettingsView> {
    Json(service.build_settings())
}

/// POST /api/settings
pub async fn save_settings(
    State(service): State<MergeService>,
    payload: Result<Json<BuildSettingsUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(update) = payload?;
    service.update_build_settings(update)?;
    Ok(Json(MessageResponse::new("Settings saved successfully")))
}

/// POST /api/trigger-jenkins
pub async fn trigger_build(
    State(service): State<MergeService>,
) -> (StatusCode, Json<TriggerResponse>) {
    match service.trigger_build().await {
        Ok(()) => (
            StatusCode::OK,
            Json(TriggerResponse {
                success: true,
                message: "Build triggered successfully".to_string(),
            }),
        ),
        Err(e) => {
            let status = match e {
                BuildTriggerError::NotConfigured => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!(error = %e, "Manual build trigger failed");
            (
                status,
                Json(TriggerResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
        }
    }
}
