//! Runs one merge against the shared working copy.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, info_span, warn, Instrument};

use super::outcome::MergeOutcome;
use crate::build::BuildTrigger;
use crate::schedule::BranchPair;
use crate::vcs::{VcsError, VcsGateway};

enum Completion {
    Pushed,
    Conflicted(String),
}

/// Drives the checkout, pull, merge and push sequence for one branch pair.
///
/// Every caller (daily triggers, auto-merge cycles, manual requests) goes
/// through a single execution slot, so at most one sequence touches the
/// working copy at a time. Waiting callers queue in arrival order.
pub struct MergeExecutor {
    inner: Arc<ExecutorInner>,
}

struct ExecutorInner {
    vcs: Arc<dyn VcsGateway>,
    build: Arc<dyn BuildTrigger>,
    remote: String,
    slot: Mutex<()>,
}

impl MergeExecutor {
    /// Creates an executor pulling from and pushing to `remote`.
    pub fn new(
        vcs: Arc<dyn VcsGateway>,
        build: Arc<dyn BuildTrigger>,
        remote: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                vcs,
                build,
                remote: remote.into(),
                slot: Mutex::new(()),
            }),
        }
    }

    /// Remote used for pull and push.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.inner.remote
    }

    /// Waits for the working copy to be free and holds it until the guard is
    /// dropped. Used by read-only git calls that must not interleave with a
    /// merge.
    pub async fn acquire_slot(&self) -> MutexGuard<'_, ()> {
        self.inner.slot.lock().await
    }

    /// Merges `pair.source` into `pair.target` and pushes the result.
    ///
    /// Never fails: git errors and conflicts are reported in the outcome.
    /// The sequence runs on its own task, so it completes even if the caller
    /// stops waiting.
    pub async fn execute(&self, pair: &BranchPair) -> MergeOutcome {
        let span = info_span!("merge", source = %pair.source, target = %pair.target);
        let inner = Arc::clone(&self.inner);
        let pair = pair.clone();

        let task = tokio::spawn(
            async move { inner.execute_locked(&pair).await }.instrument(span),
        );
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Merge task did not complete");
                metrics::counter!("mergeflow_merges_total", "outcome" => "failure")
                    .increment(1);
                MergeOutcome::failed(format!("Merge task did not complete: {e}"))
            }
        }
    }
}

impl ExecutorInner {
    async fn execute_locked(&self, pair: &BranchPair) -> MergeOutcome {
        let _slot = self.slot.lock().await;

        let outcome = match self.run_sequence(pair).await {
            Ok(Completion::Pushed) => {
                self.fire_build().await;
                info!("Merge completed");
                MergeOutcome::succeeded()
            }
            Ok(Completion::Conflicted(output)) => {
                warn!("Merge conflict detected, merge aborted");
                MergeOutcome::conflict(output)
            }
            Err(e) => {
                warn!(error = %e, "Merge failed");
                MergeOutcome::failed(e.to_string())
            }
        };

        metrics::counter!("mergeflow_merges_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn run_sequence(&self, pair: &BranchPair) -> Result<Completion, VcsError> {
        self.vcs.checkout(&pair.source).await?;
        self.vcs.pull(&self.remote, &pair.source).await?;
        self.vcs.checkout(&pair.target).await?;
        self.vcs.pull(&self.remote, &pair.target).await?;

        let merge = self.vcs.merge(&pair.source).await?;
        if merge.has_conflicts() {
            if let Err(e) = self.vcs.abort_merge().await {
                warn!(error = %e, "Failed to abort conflicted merge");
            }
            return Ok(Completion::Conflicted(merge.output));
        }

        self.vcs.push(&self.remote, &pair.target).await?;
        Ok(Completion::Pushed)
    }

    async fn fire_build(&self) {
        if !self.build.is_configured() {
            return;
        }

        match self.build.trigger().await {
            Ok(()) => {
                info!("Build triggered");
                metrics::counter!("mergeflow_build_triggers_total", "result" => "ok").increment(1);
            }
            Err(e) => {
                warn!(error = %e, "Build trigger failed");
                metrics::counter!("mergeflow_build_triggers_total", "result" => "error")
                    .increment(1);
            }
        }
    }
}
