//! Time-driven execution: the trigger table, the auto-merge controller and
//! the background loop that fires them.

pub mod auto_merge;
pub mod clock;
pub mod runner;
pub mod triggers;

pub use auto_merge::{AutoMergeController, AutoMergeError, AutoMergeStatus, MergeAllReport};
pub use clock::{Clock, SystemClock};
pub use runner::SchedulerLoop;
pub use triggers::{TriggerAction, TriggerHandle, TriggerTable};
