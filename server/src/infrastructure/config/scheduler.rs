//! Scheduler loop and auto-merge settings.

use serde::Deserialize;
use std::time::Duration;

/// Scheduler settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerSettings {
    /// Seconds between trigger evaluations.
    pub poll_interval_secs: u64,
    /// Auto-merge interval in minutes at startup.
    pub default_interval_minutes: u32,
}

impl SchedulerSettings {
    /// Evaluation cadence as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
