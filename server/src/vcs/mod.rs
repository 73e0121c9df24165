//! Version-control gateway.
//!
//! The merge executor only speaks to git through [`VcsGateway`], so the whole
//! merge sequence can be exercised against a recording double in tests.

mod git;

pub use git::GitCli;

use async_trait::async_trait;

/// Marker git prints for every conflicting path during a merge.
pub const CONFLICT_MARKER: &str = "CONFLICT";

/// Errors raised by git operations.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The git binary could not be started.
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// git ran and exited unsuccessfully.
    #[error("`{command}` failed: {output}")]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Combined stdout/stderr.
        output: String,
    },
    /// The configured path is not a git working copy.
    #[error("Not a git repository: {0}")]
    NotARepository(String),
}

/// Textual result of a merge attempt that git did not reject outright.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOutput {
    /// Combined stdout/stderr of the merge.
    pub output: String,
}

impl MergeOutput {
    /// Whether the merge stopped on conflicts.
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        self.output.contains(CONFLICT_MARKER)
    }
}

/// Operations the merge workflow needs from the local working copy.
#[async_trait]
pub trait VcsGateway: Send + Sync {
    /// Switch the working copy to `branch`.
    async fn checkout(&self, branch: &str) -> Result<(), VcsError>;

    /// Pull `branch` from `remote` into the current branch.
    async fn pull(&self, remote: &str, branch: &str) -> Result<(), VcsError>;

    /// Merge `branch` into the current branch.
    ///
    /// A conflicted merge is not an error: it returns `Ok` with output
    /// containing [`CONFLICT_MARKER`] and leaves the merge in progress.
    async fn merge(&self, branch: &str) -> Result<MergeOutput, VcsError>;

    /// Abandon an in-progress merge.
    async fn abort_merge(&self) -> Result<(), VcsError>;

    /// Push `branch` to `remote`.
    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError>;

    /// Names of all local branches.
    async fn local_branches(&self) -> Result<Vec<String>, VcsError>;

    /// Fetch every remote.
    async fn fetch_all(&self) -> Result<(), VcsError>;

    /// Remote-tracking refs as `remote/branch`, without symbolic `HEAD` refs.
    async fn remote_refs(&self) -> Result<Vec<String>, VcsError>;
}

/// Renders remote-tracking refs for display.
///
/// Refs on `default_remote` lose their remote prefix; refs on any other
/// remote keep it. Symbolic `HEAD` refs and bare remote names are dropped.
#[must_use]
pub fn format_remote_branches(refs: &[String], default_remote: &str) -> Vec<String> {
    refs.iter()
        .filter_map(|reference| {
            let (remote, branch) = reference.split_once('/')?;
            if branch.is_empty() || branch == "HEAD" {
                return None;
            }
            if remote == default_remote {
                Some(branch.to_string())
            } else {
                Some(reference.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_default_remote_prefix_is_stripped() {
        let formatted = format_remote_branches(
            &refs(&["origin/main", "origin/feature/login", "upstream/main"]),
            "origin",
        );
        assert_eq!(formatted, refs(&["main", "feature/login", "upstream/main"]));
    }

    #[test]
    fn test_head_refs_are_skipped() {
        let formatted =
            format_remote_branches(&refs(&["origin/HEAD", "origin", "origin/dev"]), "origin");
        assert_eq!(formatted, refs(&["dev"]));
    }

    #[test]
    fn test_conflict_detection() {
        let clean = MergeOutput {
            output: "Fast-forward\n file | 1 +".into(),
        };
        let conflicted = MergeOutput {
            output: "CONFLICT (content): Merge conflict in a.txt".into(),
        };
        assert!(!clean.has_conflicts());
        assert!(conflicted.has_conflicts());
    }
}
