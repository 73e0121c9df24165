//! Outcome of a single merge attempt.

use serde::{Deserialize, Serialize};

/// Message reported for a merge that was pushed.
pub const MERGE_SUCCEEDED: &str = "Merge completed successfully";
/// Message reported for a merge that stopped on conflicts.
pub const MERGE_CONFLICT: &str = "Merge conflict detected";

/// Result of one merge attempt, returned to manual callers and logged for
/// scheduled runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Whether the target branch was merged and pushed.
    #[serde(rename = "success")]
    pub succeeded: bool,
    /// Human-readable summary, or the failure description.
    pub message: String,
    /// Raw git output when the merge conflicted.
    #[serde(rename = "details", default, skip_serializing_if = "Option::is_none")]
    pub conflict_details: Option<String>,
}

impl MergeOutcome {
    /// A merge that was pushed.
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            succeeded: true,
            message: MERGE_SUCCEEDED.to_string(),
            conflict_details: None,
        }
    }

    /// A merge that conflicted and was aborted.
    #[must_use]
    pub fn conflict(details: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: MERGE_CONFLICT.to_string(),
            conflict_details: Some(details.into()),
        }
    }

    /// A merge that failed before completing.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
            conflict_details: None,
        }
    }

    /// Metric label for this outcome.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match (self.succeeded, self.conflict_details.is_some()) {
            (true, _) => "success",
            (false, true) => "conflict",
            (false, false) => "failure",
        }
    }
}
