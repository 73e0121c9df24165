//! Routes for the auto-merge endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::auto_merge::handlers::{set_enabled, set_interval, status};
use crate::service::MergeService;

/// Auto-merge control routes.
pub fn routes() -> Router<MergeService> {
    Router::new()
        .route("/api/auto-merge", post(set_enabled))
        .route("/api/auto-merge/status", get(status))
        .route("/api/auto-merge/interval", post(set_interval))
}
