//! Configuration management for the merge service.
//!
//! Settings are layered: built-in defaults, then an optional `mergeflow.toml`
//! in the working directory, then `MERGEFLOW__*` environment variables.
//!
//! # Example
//!
//! ```no_run
//! use mergeflow_server::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! println!("{}", settings.repository.path.display());
//! ```

pub mod repository;
pub mod scheduler;
pub mod server;
pub mod storage;
pub mod telemetry;

pub use repository::RepositorySettings;
pub use scheduler::SchedulerSettings;
pub use server::ServerSettings;
pub use storage::StorageSettings;
pub use telemetry::TelemetrySettings;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Repository path variable understood for compatibility with older setups.
pub const LEGACY_REPO_PATH_VAR: &str = "GIT_REPO_PATH";

/// Top-level configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Working copy settings.
    pub repository: RepositorySettings,
    /// Persisted file locations.
    pub storage: StorageSettings,
    /// Scheduler settings.
    pub scheduler: SchedulerSettings,
    /// Logging settings.
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Loads settings from defaults, `mergeflow.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized,
    /// notably when no repository path is configured.
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = defaults()?;
        if let Ok(legacy) = std::env::var(LEGACY_REPO_PATH_VAR) {
            builder = builder.set_default("repository.path", legacy)?;
        }

        builder
            .add_source(File::with_name("mergeflow").required(false))
            .add_source(Environment::with_prefix("MERGEFLOW").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Loads settings from defaults overlaid with a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid or required keys are missing.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5000)?
        .set_default("server.allowed_origin", "*")?
        .set_default("repository.remote", "origin")?
        .set_default("storage.jobs_file", "merge_configs.json")?
        .set_default("storage.build_settings_file", "jenkins_settings.json")?
        .set_default("scheduler.poll_interval_secs", 60)?
        .set_default("scheduler.default_interval_minutes", 20)?
        .set_default("telemetry.log_level", "info")?
        .set_default("telemetry.json", true)
}

/// Helper for strong typing addresses
pub struct BindAddress(pub String, pub u16);

impl BindAddress {
    /// Converts the bind address to a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the IP address string cannot be parsed.
    pub fn to_socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        let ip = self
            .0
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid IP address '{}': {e}", self.0))?;
        Ok(std::net::SocketAddr::new(ip, self.1))
    }
}

impl From<&ServerSettings> for BindAddress {
    fn from(server: &ServerSettings) -> Self {
        Self(server.host.clone(), server.port)
    }
}
