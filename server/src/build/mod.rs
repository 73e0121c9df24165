//! Downstream build trigger fired after a successful merge.

mod jenkins;
mod settings;

pub use jenkins::JenkinsTrigger;
pub use settings::{
    BuildSettingsStore, BuildSettingsUpdate, BuildSettingsView, BuildTriggerConfig, TOKEN_MASK,
};

use async_trait::async_trait;

/// Errors raised while firing the build trigger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildTriggerError {
    /// No trigger URL has been configured.
    #[error("Build trigger is not configured")]
    NotConfigured,
    /// The configured URL cannot be parsed.
    #[error("Invalid build trigger URL: {0}")]
    InvalidUrl(String),
    /// The request never produced a response.
    #[error("Build trigger request failed: {0}")]
    Transport(String),
    /// The server answered with something other than 201 Created.
    #[error("Build trigger returned HTTP {0}")]
    UnexpectedStatus(u16),
}

/// A post-merge side effect, typically a CI job.
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    /// Whether a trigger target is configured at all.
    fn is_configured(&self) -> bool;

    /// Fires the build once.
    async fn trigger(&self) -> Result<(), BuildTriggerError>;
}
