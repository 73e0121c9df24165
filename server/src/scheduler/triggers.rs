//! Trigger facility shared by daily jobs and the auto-merge interval.
//!
//! Every trigger is addressed by its own [`TriggerHandle`], so removing one
//! job or toggling auto-merge never disturbs the other registrations.
//!
//! Daily triggers arm for the next occurrence of their time strictly after
//! the registration instant, fire once the clock reaches it, and re-arm for
//! the following day. A run missed while the process was down is skipped.
//! Interval triggers fire when their period has elapsed since registration or
//! since the previous firing.

use chrono::{NaiveDateTime, TimeDelta};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::clock::Clock;
use crate::schedule::{BranchPair, JobId, TimeOfDay};

/// Handle returned on registration, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerHandle(u64);

/// What to do when a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerAction {
    /// Run one scheduled job.
    Merge {
        /// Job that owns the trigger.
        job_id: JobId,
        /// Branches bound at registration.
        pair: BranchPair,
    },
    /// Run every configured job (auto-merge cycle).
    MergeAll,
}

#[derive(Debug, Clone, Copy)]
enum Cadence {
    Daily(TimeOfDay),
    Every(TimeDelta),
}

impl Cadence {
    fn next_after(self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Daily(at) => {
                let today = now.date().and_time(at.as_naive_time());
                if today > now {
                    today
                } else {
                    today + TimeDelta::days(1)
                }
            }
            Self::Every(period) => now + period,
        }
    }
}

#[derive(Debug)]
struct Trigger {
    cadence: Cadence,
    action: TriggerAction,
    next_run: NaiveDateTime,
}

/// Registry of pending triggers.
pub struct TriggerTable {
    clock: Arc<dyn Clock>,
    next_id: AtomicU64,
    triggers: Mutex<BTreeMap<TriggerHandle, Trigger>>,
}

impl std::fmt::Debug for TriggerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerTable")
            .field("triggers", &self.triggers.lock().len())
            .finish_non_exhaustive()
    }
}

impl TriggerTable {
    /// Creates an empty table reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(1),
            triggers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Registers a trigger firing every day at `at`.
    pub fn schedule_daily(&self, at: TimeOfDay, action: TriggerAction) -> TriggerHandle {
        self.insert(Cadence::Daily(at), action)
    }

    /// Registers a trigger firing every `minutes` minutes.
    pub fn schedule_every(&self, minutes: u32, action: TriggerAction) -> TriggerHandle {
        self.insert(Cadence::Every(TimeDelta::minutes(i64::from(minutes))), action)
    }

    fn insert(&self, cadence: Cadence, action: TriggerAction) -> TriggerHandle {
        let handle = TriggerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let next_run = cadence.next_after(self.clock.now());
        self.triggers.lock().insert(
            handle,
            Trigger {
                cadence,
                action,
                next_run,
            },
        );
        handle
    }

    /// Cancels one trigger. Returns `false` if it was already gone.
    pub fn cancel(&self, handle: TriggerHandle) -> bool {
        self.triggers.lock().remove(&handle).is_some()
    }

    /// Number of registered triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.lock().len()
    }

    /// Whether no triggers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.lock().is_empty()
    }

    /// When the given trigger will next fire.
    #[must_use]
    pub fn next_run(&self, handle: TriggerHandle) -> Option<NaiveDateTime> {
        self.triggers.lock().get(&handle).map(|t| t.next_run)
    }

    /// Collects the actions of every due trigger, in registration order, and
    /// re-arms them.
    pub fn take_due(&self) -> Vec<TriggerAction> {
        let now = self.clock.now();
        let mut triggers = self.triggers.lock();
        let mut due = Vec::new();

        for trigger in triggers.values_mut() {
            if trigger.next_run <= now {
                due.push(trigger.action.clone());
                trigger.next_run = trigger.cadence.next_after(now);
            }
        }

        due
    }
}
