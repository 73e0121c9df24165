//! Locations of the persisted JSON documents.

use serde::Deserialize;
use std::path::PathBuf;

/// Storage file locations, relative to the working directory unless absolute.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Merge job array.
    pub jobs_file: PathBuf,
    /// Build trigger settings.
    pub build_settings_file: PathBuf,
}
