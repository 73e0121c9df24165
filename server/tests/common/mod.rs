//! Test doubles shared by the integration tests.
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use mergeflow_server::build::{BuildSettingsStore, BuildTrigger, BuildTriggerError};
use mergeflow_server::scheduler::Clock;
use mergeflow_server::service::{MergeService, ServiceConfig, ServiceDeps};
use mergeflow_server::vcs::{MergeOutput, VcsError, VcsGateway};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// VCS gateway
// =============================================================================

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Checkout(String),
    Pull(String, String),
    Merge(String),
    AbortMerge,
    Push(String, String),
    LocalBranches,
    FetchAll,
    RemoteRefs,
}

/// Recording gateway with conflict and error injection.
///
/// Every call is logged, optionally delayed, and counted while in flight so
/// tests can detect overlapping use of the working copy.
pub struct MockVcsGateway {
    calls: Mutex<Vec<VcsCall>>,
    conflicts: Mutex<HashSet<String>>,
    failures: Mutex<HashMap<&'static str, String>>,
    local_branches: Mutex<Vec<String>>,
    remote_refs: Mutex<Vec<String>>,
    step_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockVcsGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVcsGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            conflicts: Mutex::new(HashSet::new()),
            failures: Mutex::new(HashMap::new()),
            local_branches: Mutex::new(Vec::new()),
            remote_refs: Mutex::new(Vec::new()),
            step_delay: Mutex::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Merging `source` reports a conflict.
    pub fn conflict_on(&self, source: &str) {
        self.conflicts.lock().unwrap().insert(source.to_string());
    }

    /// Make the named operation (`checkout`, `pull`, `merge`, `push`,
    /// `abort`, `branches`, `fetch`, `remote_refs`) fail.
    pub fn fail(&self, operation: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, message.to_string());
    }

    pub fn set_local_branches(&self, branches: &[&str]) {
        *self.local_branches.lock().unwrap() = branches.iter().map(ToString::to_string).collect();
    }

    pub fn set_remote_refs(&self, refs: &[&str]) {
        *self.remote_refs.lock().unwrap() = refs.iter().map(ToString::to_string).collect();
    }

    /// Sleep this long inside every call.
    pub fn set_step_delay(&self, delay: Duration) {
        *self.step_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VcsCall::Push(..)))
            .count()
    }

    pub fn merge_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VcsCall::Merge(..)))
            .count()
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: VcsCall, operation: &'static str) -> Result<(), VcsError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);

        let delay = *self.step_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.failures.lock().unwrap().get(operation) {
            Some(message) => Err(VcsError::CommandFailed {
                command: format!("git {operation}"),
                output: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VcsGateway for MockVcsGateway {
    async fn checkout(&self, branch: &str) -> Result<(), VcsError> {
        self.record(VcsCall::Checkout(branch.to_string()), "checkout")
            .await
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.record(VcsCall::Pull(remote.to_string(), branch.to_string()), "pull")
            .await
    }

    async fn merge(&self, branch: &str) -> Result<MergeOutput, VcsError> {
        self.record(VcsCall::Merge(branch.to_string()), "merge")
            .await?;
        let output = if self.conflicts.lock().unwrap().contains(branch) {
            format!("Auto-merging a.txt\nCONFLICT (content): Merge conflict in a.txt\nfrom {branch}")
        } else {
            "Merge made by the 'ort' strategy.".to_string()
        };
        Ok(MergeOutput { output })
    }

    async fn abort_merge(&self) -> Result<(), VcsError> {
        self.record(VcsCall::AbortMerge, "abort").await
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.record(VcsCall::Push(remote.to_string(), branch.to_string()), "push")
            .await
    }

    async fn local_branches(&self) -> Result<Vec<String>, VcsError> {
        self.record(VcsCall::LocalBranches, "branches").await?;
        Ok(self.local_branches.lock().unwrap().clone())
    }

    async fn fetch_all(&self) -> Result<(), VcsError> {
        self.record(VcsCall::FetchAll, "fetch").await
    }

    async fn remote_refs(&self) -> Result<Vec<String>, VcsError> {
        self.record(VcsCall::RemoteRefs, "remote_refs").await?;
        Ok(self.remote_refs.lock().unwrap().clone())
    }
}

/// The exact gateway calls of one clean merge.
pub fn clean_sequence(source: &str, target: &str) -> Vec<VcsCall> {
    vec![
        VcsCall::Checkout(source.to_string()),
        VcsCall::Pull("origin".to_string(), source.to_string()),
        VcsCall::Checkout(target.to_string()),
        VcsCall::Pull("origin".to_string(), target.to_string()),
        VcsCall::Merge(source.to_string()),
        VcsCall::Push("origin".to_string(), target.to_string()),
    ]
}

// =============================================================================
// Build trigger
// =============================================================================

/// Counts trigger calls; can be unconfigured or failing.
pub struct RecordingBuildTrigger {
    configured: AtomicBool,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl RecordingBuildTrigger {
    pub fn configured() -> Self {
        Self {
            configured: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        let trigger = Self::configured();
        trigger.configured.store(false, Ordering::SeqCst);
        trigger
    }

    pub fn failing() -> Self {
        let trigger = Self::configured();
        trigger.failing.store(true, Ordering::SeqCst);
        trigger
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildTrigger for RecordingBuildTrigger {
    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    async fn trigger(&self) -> Result<(), BuildTriggerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(BuildTriggerError::UnexpectedStatus(500))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Clock
// =============================================================================

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Starts at the given time on 2026-10-16.
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            now: Mutex::new(
                NaiveDate::from_ymd_opt(2026, 10, 16)
                    .unwrap()
                    .and_hms_opt(hour, minute, 0)
                    .unwrap(),
            ),
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.now.lock().unwrap() += TimeDelta::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Service fixture
// =============================================================================

/// A service wired to test doubles, with its files in a temp dir.
pub struct Fixture {
    pub dir: TempDir,
    pub vcs: Arc<MockVcsGateway>,
    pub build: Arc<RecordingBuildTrigger>,
    pub clock: Arc<ManualClock>,
    pub service: MergeService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_build(RecordingBuildTrigger::configured())
    }

    pub fn with_build(build: RecordingBuildTrigger) -> Self {
        let dir = TempDir::new().unwrap();
        Self::in_dir(dir, build)
    }

    /// Builds a service over an existing directory, reloading any jobs in it.
    pub fn in_dir(dir: TempDir, build: RecordingBuildTrigger) -> Self {
        let vcs = Arc::new(MockVcsGateway::new());
        let build = Arc::new(build);
        let clock = Arc::new(ManualClock::at(8, 0));
        let build_settings = Arc::new(BuildSettingsStore::load(
            dir.path().join("jenkins_settings.json"),
        ));

        let service = MergeService::new(
            ServiceConfig {
                jobs_file: dir.path().join("merge_configs.json"),
                remote: "origin".to_string(),
                default_interval_minutes: 20,
            },
            ServiceDeps {
                vcs: vcs.clone(),
                build: build.clone(),
                build_settings,
                clock: clock.clone(),
            },
        );

        Self {
            dir,
            vcs,
            build,
            clock,
            service,
        }
    }
}

/// Whether a usable `git` binary is on the path.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}
