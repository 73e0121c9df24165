//! Auto-merge toggle, interval and status endpoints.

pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::routes;
pub use types::{IntervalRequest, ToggleRequest};
