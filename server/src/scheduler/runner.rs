//! Background task that fires due triggers.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::triggers::TriggerAction;
use crate::service::MergeService;

/// Fastest allowed evaluation cadence.
const MIN_POLL: Duration = Duration::from_secs(1);

/// Periodically evaluates the trigger table and runs what is due.
///
/// This is the only driver of scheduled merges. Each due action is awaited
/// before the next one starts.
pub struct SchedulerLoop {
    service: MergeService,
    poll: Duration,
}

impl SchedulerLoop {
    /// Creates a loop evaluating triggers every `poll`.
    #[must_use]
    pub fn new(service: MergeService, poll: Duration) -> Self {
        Self {
            service,
            poll: poll.max(MIN_POLL),
        }
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.poll);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poll_secs = self.poll.as_secs(), "Scheduler loop started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_pending().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Scheduler loop stopped");
    }

    /// Runs every action that is due now. Returns how many ran.
    pub async fn run_pending(&self) -> usize {
        let due = self.service.triggers().take_due();
        if due.is_empty() {
            return 0;
        }
        debug!(count = due.len(), "Running due triggers");

        for action in &due {
            match action {
                TriggerAction::Merge { job_id, pair } => {
                    let outcome = self.service.executor().execute(pair).await;
                    if outcome.succeeded {
                        info!(id = %job_id, %pair, "Scheduled merge completed");
                    } else {
                        warn!(
                            id = %job_id,
                            %pair,
                            message = %outcome.message,
                            "Scheduled merge failed"
                        );
                    }
                }
                TriggerAction::MergeAll => {
                    self.service.auto_merge().run_all_configured().await;
                }
            }
        }

        due.len()
    }
}
