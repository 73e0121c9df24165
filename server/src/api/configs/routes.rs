//! Routes for `/api/configs`.

use axum::{
    routing::{delete, get},
    Router,
};

use crate::api::configs::handlers::{add_config, delete_config, list_configs};
use crate::service::MergeService;

/// Job list, add and delete.
pub fn routes() -> Router<MergeService> {
    Router::new()
        .route("/api/configs", get(list_configs).post(add_config))
        .route("/api/configs/{id}", delete(delete_config))
}
