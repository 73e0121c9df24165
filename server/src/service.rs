//! The single service object shared by the HTTP layer and the scheduler loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::build::{
    BuildSettingsStore, BuildSettingsUpdate, BuildSettingsView, BuildTrigger, BuildTriggerError,
};
use crate::infrastructure::audit::{log_audit, AuditEvent};
use crate::infrastructure::config::Settings;
use crate::infrastructure::storage::StorageError;
use crate::merge::{MergeExecutor, MergeOutcome};
use crate::schedule::{
    BranchPair, JobId, JobStore, MergeJob, NewMergeJob, ScheduleError, ScheduleRegistry,
};
use crate::scheduler::{
    AutoMergeController, AutoMergeError, AutoMergeStatus, Clock, MergeAllReport, SchedulerLoop,
    TriggerTable,
};
use crate::vcs::{format_remote_branches, VcsError, VcsGateway};

/// Wiring parameters that do not come from collaborators.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// File holding the merge job array.
    pub jobs_file: PathBuf,
    /// Remote to pull from and push to.
    pub remote: String,
    /// Initial auto-merge interval in minutes.
    pub default_interval_minutes: u32,
}

impl ServiceConfig {
    /// Extracts the service parameters from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            jobs_file: settings.storage.jobs_file.clone(),
            remote: settings.repository.remote.clone(),
            default_interval_minutes: settings.scheduler.default_interval_minutes,
        }
    }
}

/// External collaborators the service drives.
pub struct ServiceDeps {
    /// Working copy access.
    pub vcs: Arc<dyn VcsGateway>,
    /// Post-merge build trigger.
    pub build: Arc<dyn BuildTrigger>,
    /// Build trigger settings.
    pub build_settings: Arc<BuildSettingsStore>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

struct MergeServiceInner {
    registry: Arc<ScheduleRegistry>,
    executor: Arc<MergeExecutor>,
    auto_merge: Arc<AutoMergeController>,
    triggers: Arc<TriggerTable>,
    vcs: Arc<dyn VcsGateway>,
    build: Arc<dyn BuildTrigger>,
    build_settings: Arc<BuildSettingsStore>,
    remote: String,
}

/// Owns the job registry, the executor, the auto-merge controller and the
/// trigger table. Cheap to clone.
#[derive(Clone)]
pub struct MergeService {
    inner: Arc<MergeServiceInner>,
}

impl MergeService {
    /// Loads persisted jobs, arms their triggers and wires everything together.
    #[must_use]
    pub fn new(config: ServiceConfig, deps: ServiceDeps) -> Self {
        let triggers = Arc::new(TriggerTable::new(deps.clock.clone()));
        let registry = Arc::new(ScheduleRegistry::load(
            JobStore::new(config.jobs_file),
            triggers.clone(),
        ));
        let executor = Arc::new(MergeExecutor::new(
            deps.vcs.clone(),
            deps.build.clone(),
            config.remote.clone(),
        ));
        let auto_merge = Arc::new(AutoMergeController::new(
            config.default_interval_minutes,
            triggers.clone(),
            registry.clone(),
            executor.clone(),
            deps.clock,
        ));

        Self {
            inner: Arc::new(MergeServiceInner {
                registry,
                executor,
                auto_merge,
                triggers,
                vcs: deps.vcs,
                build: deps.build,
                build_settings: deps.build_settings,
                remote: config.remote,
            }),
        }
    }

    /// Background loop driving this service's triggers.
    #[must_use]
    pub fn scheduler_loop(&self, poll: Duration) -> SchedulerLoop {
        SchedulerLoop::new(self.clone(), poll)
    }

    /// Job registry.
    #[must_use]
    pub fn registry(&self) -> &ScheduleRegistry {
        &self.inner.registry
    }

    /// Merge executor.
    #[must_use]
    pub fn executor(&self) -> &MergeExecutor {
        &self.inner.executor
    }

    /// Auto-merge controller.
    #[must_use]
    pub fn auto_merge(&self) -> &AutoMergeController {
        &self.inner.auto_merge
    }

    /// Trigger table.
    #[must_use]
    pub fn triggers(&self) -> &TriggerTable {
        &self.inner.triggers
    }

    /// All jobs in insertion order.
    #[must_use]
    pub fn jobs(&self) -> Vec<MergeJob> {
        self.inner.registry.list()
    }

    /// Registers a job.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from the registry.
    pub fn add_job(&self, submitted: NewMergeJob) -> Result<MergeJob, ScheduleError> {
        let job = self.inner.registry.add(submitted)?;
        log_audit(&AuditEvent::JobAdded {
            id: job.id.to_string(),
            source_branch: job.source_branch.clone(),
            target_branch: job.target_branch.clone(),
            time: job.time.to_string(),
        });
        Ok(job)
    }

    /// Removes a job.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn remove_job(&self, id: &JobId) -> Result<MergeJob, ScheduleError> {
        let job = self.inner.registry.remove(id)?;
        log_audit(&AuditEvent::JobRemoved { id: id.to_string() });
        Ok(job)
    }

    /// Runs one merge now, queueing behind any merge in flight.
    pub async fn merge_now(&self, pair: &BranchPair) -> MergeOutcome {
        self.inner.executor.execute(pair).await
    }

    /// Local branch names.
    ///
    /// # Errors
    ///
    /// Returns the git failure.
    pub async fn local_branches(&self) -> Result<Vec<String>, VcsError> {
        let _slot = self.inner.executor.acquire_slot().await;
        self.inner.vcs.local_branches().await
    }

    /// Fetches every remote and lists remote branches for display.
    ///
    /// # Errors
    ///
    /// Returns the git failure, including a failed fetch.
    pub async fn remote_branches(&self) -> Result<Vec<String>, VcsError> {
        let _slot = self.inner.executor.acquire_slot().await;
        self.inner.vcs.fetch_all().await?;
        let refs = self.inner.vcs.remote_refs().await?;
        Ok(format_remote_branches(&refs, &self.inner.remote))
    }

    /// Switches auto-merge on or off.
    pub fn set_auto_merge(&self, enabled: bool) {
        self.inner.auto_merge.set_enabled(enabled);
        log_audit(&AuditEvent::AutoMergeToggled { enabled });
    }

    /// Changes the auto-merge interval, running a cycle at once if enabled.
    ///
    /// The change and its cycle run on their own task, so they complete even
    /// if the caller stops waiting.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInterval` for values below one minute.
    pub async fn set_auto_merge_interval(
        &self,
        minutes: i64,
    ) -> Result<Option<MergeAllReport>, AutoMergeError> {
        let auto_merge = Arc::clone(&self.inner.auto_merge);
        let task = tokio::spawn(async move {
            let old_minutes = auto_merge.status().interval_minutes;
            let report = auto_merge.set_interval(minutes).await?;
            log_audit(&AuditEvent::AutoMergeIntervalChanged {
                old_minutes,
                new_minutes: auto_merge.status().interval_minutes,
            });
            Ok::<_, AutoMergeError>(report)
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                error!(error = %e, "Auto merge interval task did not complete");
                Ok(None)
            }
        }
    }

    /// Auto-merge flag, interval and last run.
    #[must_use]
    pub fn auto_merge_status(&self) -> AutoMergeStatus {
        self.inner.auto_merge.status()
    }

    /// Fires the build trigger outside of a merge.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when no URL is set, otherwise the trigger
    /// failure.
    pub async fn trigger_build(&self) -> Result<(), BuildTriggerError> {
        if !self.inner.build.is_configured() {
            return Err(BuildTriggerError::NotConfigured);
        }
        let result = self.inner.build.trigger().await;
        let label = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("mergeflow_build_triggers_total", "result" => label).increment(1);
        result
    }

    /// Build settings with the token masked.
    #[must_use]
    pub fn build_settings(&self) -> BuildSettingsView {
        self.inner.build_settings.view()
    }

    /// Replaces the build settings.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the settings file cannot be written.
    pub fn update_build_settings(
        &self,
        update: BuildSettingsUpdate,
    ) -> Result<BuildSettingsView, StorageError> {
        let view = self.inner.build_settings.update(update)?;
        log_audit(&AuditEvent::BuildSettingsChanged {
            url: view.url.clone(),
            username: view.username.clone(),
        });
        Ok(view)
    }
}
