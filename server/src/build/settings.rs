//! Build trigger settings and their JSON file.

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::infrastructure::storage::{read_json, write_json, StorageError};

/// Placeholder shown instead of a stored token.
pub const TOKEN_MASK: &str = "********";

/// Where and how to fire the downstream build.
#[derive(Debug, Clone)]
pub struct BuildTriggerConfig {
    /// Trigger URL. Empty means "not configured".
    pub url: String,
    /// Basic-auth user name.
    pub username: String,
    /// Basic-auth password or API token.
    pub token: SecretString,
}

impl Default for BuildTriggerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            token: SecretString::new("".into()),
        }
    }
}

impl BuildTriggerConfig {
    /// Whether a trigger URL has been set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// On-disk shape. The token is stored in clear, as the file is the
/// credential store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    url: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    token: String,
}

impl From<StoredSettings> for BuildTriggerConfig {
    fn from(stored: StoredSettings) -> Self {
        Self {
            url: stored.url,
            username: stored.username,
            token: SecretString::new(stored.token.into()),
        }
    }
}

impl From<&BuildTriggerConfig> for StoredSettings {
    fn from(config: &BuildTriggerConfig) -> Self {
        Self {
            url: config.url.clone(),
            username: config.username.clone(),
            token: config.token.expose_secret().to_string(),
        }
    }
}

/// Settings as returned to API callers, token masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSettingsView {
    /// Trigger URL.
    pub url: String,
    /// Basic-auth user name.
    pub username: String,
    /// [`TOKEN_MASK`] when a token is stored, otherwise empty.
    pub token: String,
}

/// Settings submitted by API callers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSettingsUpdate {
    /// New trigger URL.
    #[serde(default)]
    pub url: String,
    /// New user name.
    #[serde(default)]
    pub username: String,
    /// New token. `None` or [`TOKEN_MASK`] keeps the stored one.
    #[serde(default)]
    pub token: Option<String>,
}

/// Current build settings, mirrored to a JSON file.
#[derive(Debug)]
pub struct BuildSettingsStore {
    path: PathBuf,
    current: RwLock<BuildTriggerConfig>,
}

impl BuildSettingsStore {
    /// Loads settings from `path`. Missing or unreadable files yield an
    /// unconfigured trigger.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_json::<StoredSettings>(&path) {
            Ok(Some(stored)) => stored.into(),
            Ok(None) => BuildTriggerConfig::default(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load build settings, trigger disabled"
                );
                BuildTriggerConfig::default()
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the active configuration.
    #[must_use]
    pub fn current(&self) -> BuildTriggerConfig {
        self.current.read().clone()
    }

    /// Masked snapshot for display.
    #[must_use]
    pub fn view(&self) -> BuildSettingsView {
        let current = self.current.read();
        BuildSettingsView {
            url: current.url.clone(),
            username: current.username.clone(),
            token: if current.token.expose_secret().is_empty() {
                String::new()
            } else {
                TOKEN_MASK.to_string()
            },
        }
    }

    /// Replaces the settings and rewrites the file.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the file cannot be written; the previous
    /// settings stay active in that case.
    pub fn update(&self, update: BuildSettingsUpdate) -> Result<BuildSettingsView, StorageError> {
        let mut current = self.current.write();

        let token = match update.token {
            Some(token) if token != TOKEN_MASK => SecretString::new(token.into()),
            _ => current.token.clone(),
        };
        let next = BuildTriggerConfig {
            url: update.url.trim().to_string(),
            username: update.username,
            token,
        };

        write_json(&self.path, &StoredSettings::from(&next))?;
        *current = next;
        drop(current);

        info!(url = %self.view().url, "Build settings updated");
        Ok(self.view())
    }
}
