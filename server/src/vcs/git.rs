use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::{MergeOutput, VcsError, VcsGateway, CONFLICT_MARKER};

/// [`VcsGateway`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_path: PathBuf,
    program: String,
}

struct GitOutput {
    success: bool,
    text: String,
}

impl GitCli {
    /// Opens the working copy at `repo_path`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::NotARepository`] if git does not recognise the
    /// path as a working tree.
    pub async fn open(repo_path: impl Into<PathBuf>) -> Result<Self, VcsError> {
        let cli = Self {
            repo_path: repo_path.into(),
            program: "git".to_string(),
        };

        let inside = cli.run(&["rev-parse", "--is-inside-work-tree"]).await?;
        if !inside.success || inside.text.trim() != "true" {
            return Err(VcsError::NotARepository(
                cli.repo_path.display().to_string(),
            ));
        }

        Ok(cli)
    }

    /// Working copy location.
    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    async fn run(&self, args: &[&str]) -> Result<GitOutput, VcsError> {
        let command = render(&self.program, args);
        debug!(%command, "Running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_path)
            .env("GIT_TERMINAL_PROMPT", "0")
            // Keep messages (and the CONFLICT marker) untranslated.
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        Ok(GitOutput {
            success: output.status.success(),
            text,
        })
    }

    async fn run_checked(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.run(args).await?;
        if output.success {
            Ok(output.text)
        } else {
            Err(VcsError::CommandFailed {
                command: render(&self.program, args),
                output: output.text.trim().to_string(),
            })
        }
    }

    async fn list_refs(&self, namespace: &str) -> Result<Vec<String>, VcsError> {
        let text = self
            .run_checked(&["for-each-ref", "--format=%(refname:short)", namespace])
            .await?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}

#[async_trait]
impl VcsGateway for GitCli {
    async fn checkout(&self, branch: &str) -> Result<(), VcsError> {
        self.run_checked(&["checkout", branch]).await.map(drop)
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run_checked(&["pull", "--no-rebase", "--no-edit", remote, branch])
            .await
            .map(drop)
    }

    async fn merge(&self, branch: &str) -> Result<MergeOutput, VcsError> {
        let args = ["merge", "--no-edit", branch];
        let output = self.run(&args).await?;
        if output.success || output.text.contains(CONFLICT_MARKER) {
            Ok(MergeOutput {
                output: output.text,
            })
        } else {
            Err(VcsError::CommandFailed {
                command: render(&self.program, &args),
                output: output.text.trim().to_string(),
            })
        }
    }

    async fn abort_merge(&self) -> Result<(), VcsError> {
        self.run_checked(&["merge", "--abort"]).await.map(drop)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run_checked(&["push", remote, branch]).await.map(drop)
    }

    async fn local_branches(&self) -> Result<Vec<String>, VcsError> {
        self.list_refs("refs/heads").await
    }

    async fn fetch_all(&self) -> Result<(), VcsError> {
        self.run_checked(&["fetch", "--all", "--prune"]).await.map(drop)
    }

    async fn remote_refs(&self) -> Result<Vec<String>, VcsError> {
        let refs = self.list_refs("refs/remotes").await?;
        Ok(refs
            .into_iter()
            .filter(|r| r.contains('/') && !r.ends_with("/HEAD"))
            .collect())
    }
}

fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
