//! Working copy settings.

use serde::Deserialize;
use std::path::PathBuf;

/// The git working copy merges run against.
#[derive(Debug, Deserialize, Clone)]
pub struct RepositorySettings {
    /// Path to the working copy.
    pub path: PathBuf,
    /// Remote used for pull and push.
    pub remote: String,
}
