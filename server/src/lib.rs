//! Mergeflow - scheduled and on-demand branch merging.
//!
//! This crate provides the merge orchestrator behind the `mergeflow` binary:
//! a persisted registry of daily merge jobs, a recurring "merge everything"
//! loop, a single-slot executor driving `git` against one working copy, and
//! the HTTP control plane used by the dashboard.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// HTTP API handlers and routes.
pub mod api;
/// Downstream build trigger (Jenkins) and its persisted settings.
pub mod build;
/// Infrastructure components (config, server, telemetry, audit).
pub mod infrastructure;
/// Merge execution and outcome classification.
pub mod merge;
/// Persisted merge job definitions.
pub mod schedule;
/// Background trigger evaluation and the auto-merge controller.
pub mod scheduler;
/// The service object shared by the HTTP layer and the scheduler.
pub mod service;
/// Version control gateway.
pub mod vcs;

pub use service::MergeService;
