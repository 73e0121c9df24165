//! Scheduled merge jobs: types, persistence and the registry.

pub mod registry;
pub mod storage;
pub mod types;

pub use registry::ScheduleRegistry;
pub use storage::JobStore;
pub use types::{BranchPair, JobId, MergeJob, NewMergeJob, ScheduleError, TimeOfDay};
