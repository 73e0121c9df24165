//! Wall-clock source for the scheduler.

use chrono::{Local, NaiveDateTime};

/// Source of local wall-clock time.
///
/// Daily jobs are expressed in local `HH:MM`, so everything scheduling-related
/// works on naive local timestamps.
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> NaiveDateTime;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
