//! In-memory job list backed by [`JobStore`], with one daily trigger per job.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::storage::JobStore;
use super::types::{JobId, MergeJob, NewMergeJob, ScheduleError};
use crate::scheduler::triggers::{TriggerAction, TriggerHandle, TriggerTable};

#[derive(Debug, Default)]
struct RegistryState {
    jobs: Vec<MergeJob>,
    handles: HashMap<JobId, TriggerHandle>,
}

/// Authoritative set of scheduled merge jobs.
///
/// Mutations hold the write lock across trigger registration and the file
/// rewrite, so readers never observe a job without its trigger.
#[derive(Debug)]
pub struct ScheduleRegistry {
    state: RwLock<RegistryState>,
    store: JobStore,
    triggers: Arc<TriggerTable>,
}

impl ScheduleRegistry {
    /// Loads persisted jobs and arms a daily trigger for each.
    ///
    /// A missing or unreadable file starts an empty registry; the problem is
    /// logged and the file is left untouched until the next mutation.
    pub fn load(store: JobStore, triggers: Arc<TriggerTable>) -> Self {
        let jobs = match store.load() {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(
                    path = %store.path().display(),
                    error = %e,
                    "Failed to load merge jobs, starting empty"
                );
                Vec::new()
            }
        };

        let mut handles = HashMap::with_capacity(jobs.len());
        for job in &jobs {
            handles.insert(job.id.clone(), arm(&triggers, job));
        }

        info!(count = jobs.len(), "Loaded merge jobs");
        let registry = Self {
            state: RwLock::new(RegistryState { jobs, handles }),
            store,
            triggers,
        };
        registry.report_size();
        registry
    }

    /// Validates and registers a new job.
    ///
    /// A failed file write is logged; the job stays active in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeFormat`] or
    /// [`ScheduleError::MissingField`]; nothing changes in that case.
    pub fn add(&self, submitted: NewMergeJob) -> Result<MergeJob, ScheduleError> {
        let job = submitted.into_job(JobId::generate())?;

        let mut state = self.state.write();
        let handle = arm(&self.triggers, &job);
        state.handles.insert(job.id.clone(), handle);
        state.jobs.push(job.clone());
        self.persist(&state.jobs);
        drop(state);

        info!(id = %job.id, pair = %job.pair(), time = %job.time, "Merge job added");
        self.report_size();
        Ok(job)
    }

    /// Removes a job and cancels only its trigger.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] without touching the file.
    pub fn remove(&self, id: &JobId) -> Result<MergeJob, ScheduleError> {
        let mut state = self.state.write();
        let position = state
            .jobs
            .iter()
            .position(|job| &job.id == id)
            .ok_or_else(|| ScheduleError::NotFound(id.clone()))?;

        let job = state.jobs.remove(position);
        if let Some(handle) = state.handles.remove(id) {
            self.triggers.cancel(handle);
        }
        self.persist(&state.jobs);
        drop(state);

        info!(id = %id, pair = %job.pair(), "Merge job removed");
        self.report_size();
        Ok(job)
    }

    /// Snapshot of all jobs in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<MergeJob> {
        self.state.read().jobs.clone()
    }

    /// Looks up one job.
    #[must_use]
    pub fn get(&self, id: &JobId) -> Option<MergeJob> {
        self.state.read().jobs.iter().find(|job| &job.id == id).cloned()
    }

    /// Number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().jobs.len()
    }

    /// Whether no jobs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().jobs.is_empty()
    }

    fn persist(&self, jobs: &[MergeJob]) {
        match self.store.save(jobs) {
            Ok(()) => debug!(path = %self.store.path().display(), "Merge jobs persisted"),
            Err(e) => error!(error = %e, "Failed to persist merge jobs"),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn report_size(&self) {
        metrics::gauge!("mergeflow_scheduled_jobs").set(self.len() as f64);
    }
}

fn arm(triggers: &TriggerTable, job: &MergeJob) -> TriggerHandle {
    triggers.schedule_daily(
        job.time,
        TriggerAction::Merge {
            job_id: job.id.clone(),
            pair: job.pair(),
        },
    )
}
