//! Request bodies for the auto-merge endpoints.

use serde::Deserialize;

/// Body of `POST /api/auto-merge`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    /// Desired state.
    pub enabled: bool,
}

/// Body of `POST /api/auto-merge/interval`.
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalRequest {
    /// Minutes between cycles.
    pub interval: i64,
}
