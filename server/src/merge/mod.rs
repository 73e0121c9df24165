//! Merge execution and its outcome type.

pub mod executor;
pub mod outcome;

pub use executor::MergeExecutor;
pub use outcome::MergeOutcome;
