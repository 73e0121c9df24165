use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::settings::BuildSettingsStore;
use super::{BuildTrigger, BuildTriggerError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fires a Jenkins job through its remote-trigger URL.
///
/// Settings are read on every call, so updates through the settings API take
/// effect immediately.
pub struct JenkinsTrigger {
    client: Client,
    settings: Arc<BuildSettingsStore>,
}

impl JenkinsTrigger {
    /// Creates a trigger reading its target from `settings`.
    #[must_use]
    pub fn new(settings: Arc<BuildSettingsStore>) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl BuildTrigger for JenkinsTrigger {
    fn is_configured(&self) -> bool {
        self.settings.current().is_configured()
    }

    async fn trigger(&self) -> Result<(), BuildTriggerError> {
        let config = self.settings.current();
        if !config.is_configured() {
            return Err(BuildTriggerError::NotConfigured);
        }

        let url = Url::parse(config.url.trim())
            .map_err(|e| BuildTriggerError::InvalidUrl(format!("{}: {e}", config.url)))?;

        debug!(%url, "Triggering build");
        let response = self
            .client
            .post(url)
            .basic_auth(&config.username, Some(config.token.expose_secret()))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| BuildTriggerError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(BuildTriggerError::UnexpectedStatus(status.as_u16())),
        }
    }
}
