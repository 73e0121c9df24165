//! REST API for the merge service.
//!
//! Every endpoint lives under `/api` and shares [`MergeService`] as router
//! state.

pub mod auto_merge;
pub mod branches;
pub mod configs;
pub mod error;
pub mod merge;
pub mod settings;
pub mod types;

use axum::Router;

use crate::service::MergeService;

pub use error::ApiError;

/// All API routes.
pub fn routes() -> Router<MergeService> {
    Router::new()
        .merge(configs::routes())
        .merge(merge::routes())
        .merge(branches::routes())
        .merge(auto_merge::routes())
        .merge(settings::routes())
}
