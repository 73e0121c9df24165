//! Persistence for the merge job list.

use std::path::{Path, PathBuf};

use super::types::MergeJob;
use crate::infrastructure::storage::{read_json, write_json, StorageError};

/// JSON array of [`MergeJob`]s on disk.
#[derive(Debug, Clone)]
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    /// Creates a store backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all jobs. A missing file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or not a valid job array.
    pub fn load(&self) -> Result<Vec<MergeJob>, StorageError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Rewrites the file with the full job list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, jobs: &[MergeJob]) -> Result<(), StorageError> {
        write_json(&self.path, jobs)
    }
}
