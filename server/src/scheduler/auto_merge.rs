//! Recurring "merge every configured pair" cycle.

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::clock::Clock;
use super::triggers::{TriggerAction, TriggerHandle, TriggerTable};
use crate::merge::{MergeExecutor, MergeOutcome};
use crate::schedule::{JobId, ScheduleRegistry};

/// Errors raised by the auto-merge controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoMergeError {
    /// Interval below one minute, or too large to represent.
    #[error("Interval must be at least 1 minute, got {0}")]
    InvalidInterval(i64),
}

/// Snapshot of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoMergeStatus {
    /// Whether the interval trigger is active.
    pub enabled: bool,
    /// Cycle period in minutes.
    #[serde(rename = "interval")]
    pub interval_minutes: u32,
    /// Start of the most recent cycle, local time.
    #[serde(rename = "last_merge_time")]
    pub last_run_at: Option<NaiveDateTime>,
}

/// Per-job outcomes of one merge-all cycle.
#[derive(Debug, Clone)]
pub struct MergeAllReport {
    /// When the cycle started.
    pub started_at: NaiveDateTime,
    /// Outcome for every job, in registry order.
    pub results: Vec<(JobId, MergeOutcome)>,
}

impl MergeAllReport {
    /// Number of jobs attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    /// Number of jobs that merged and pushed.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.succeeded).count()
    }
}

#[derive(Debug)]
struct AutoMergeState {
    enabled: bool,
    interval_minutes: u32,
    last_run_at: Option<NaiveDateTime>,
    trigger: Option<TriggerHandle>,
}

/// Owns the auto-merge flag, interval and interval trigger.
pub struct AutoMergeController {
    state: Mutex<AutoMergeState>,
    triggers: Arc<TriggerTable>,
    registry: Arc<ScheduleRegistry>,
    executor: Arc<MergeExecutor>,
    clock: Arc<dyn Clock>,
}

impl AutoMergeController {
    /// Creates a disabled controller with the given initial interval.
    pub fn new(
        interval_minutes: u32,
        triggers: Arc<TriggerTable>,
        registry: Arc<ScheduleRegistry>,
        executor: Arc<MergeExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Mutex::new(AutoMergeState {
                enabled: false,
                interval_minutes: interval_minutes.max(1),
                last_run_at: None,
                trigger: None,
            }),
            triggers,
            registry,
            executor,
            clock,
        }
    }

    /// Turns the interval trigger on or off. Daily job triggers are untouched.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.enabled = enabled;

        if enabled {
            if state.trigger.is_none() {
                state.trigger = Some(
                    self.triggers
                        .schedule_every(state.interval_minutes, TriggerAction::MergeAll),
                );
            }
            info!(interval_minutes = state.interval_minutes, "Auto merge enabled");
        } else {
            if let Some(handle) = state.trigger.take() {
                self.triggers.cancel(handle);
            }
            info!("Auto merge disabled");
        }
    }

    /// Changes the cycle period.
    ///
    /// While enabled, the interval trigger is re-armed at the new period and
    /// one cycle runs immediately; its report is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AutoMergeError::InvalidInterval`] for values below one
    /// minute; the current interval is kept.
    pub async fn set_interval(
        &self,
        minutes: i64,
    ) -> Result<Option<MergeAllReport>, AutoMergeError> {
        let interval = u32::try_from(minutes)
            .ok()
            .filter(|m| *m >= 1)
            .ok_or(AutoMergeError::InvalidInterval(minutes))?;

        let rearmed = {
            let mut state = self.state.lock();
            state.interval_minutes = interval;
            if state.enabled {
                if let Some(handle) = state.trigger.take() {
                    self.triggers.cancel(handle);
                }
                state.trigger = Some(
                    self.triggers
                        .schedule_every(interval, TriggerAction::MergeAll),
                );
            }
            state.enabled
        };

        info!(interval_minutes = interval, "Auto merge interval updated");
        if rearmed {
            Ok(self.run_all_configured().await)
        } else {
            Ok(None)
        }
    }

    /// Runs every registered job once, in registry order.
    ///
    /// Does nothing and returns `None` while disabled. Failures are logged
    /// per job and never stop the cycle.
    pub async fn run_all_configured(&self) -> Option<MergeAllReport> {
        let started_at = {
            let mut state = self.state.lock();
            if !state.enabled {
                return None;
            }
            let now = self.clock.now();
            state.last_run_at = Some(now);
            now
        };

        let jobs = self.registry.list();
        info!(jobs = jobs.len(), "Starting auto merge cycle");

        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let outcome = self.executor.execute(&job.pair()).await;
            if !outcome.succeeded {
                warn!(
                    id = %job.id,
                    pair = %job.pair(),
                    message = %outcome.message,
                    "Auto merge job failed"
                );
            }
            results.push((job.id, outcome));
        }

        let report = MergeAllReport {
            started_at,
            results,
        };
        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded(),
            "Auto merge cycle finished"
        );
        Some(report)
    }

    /// Current flag, interval and last run.
    #[must_use]
    pub fn status(&self) -> AutoMergeStatus {
        let state = self.state.lock();
        AutoMergeStatus {
            enabled: state.enabled,
            interval_minutes: state.interval_minutes,
            last_run_at: state.last_run_at,
        }
    }
}
