use serde::Serialize;
use tracing::{info, info_span};

/// Domain event for audit logging.
/// Structured for JSON serialization to enable machine-readable audit trails.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Process came up.
    SystemStartup {
        /// Component that started.
        component: String,
    },
    /// Process is going down.
    SystemShutdown {
        /// Why.
        reason: String,
    },
    /// A merge job was registered.
    JobAdded {
        /// New job id.
        id: String,
        /// Source branch.
        source_branch: String,
        /// Target branch.
        target_branch: String,
        /// Daily `HH:MM`.
        time: String,
    },
    /// A merge job was removed.
    JobRemoved {
        /// Removed job id.
        id: String,
    },
    /// Auto-merge was switched on or off.
    AutoMergeToggled {
        /// New state.
        enabled: bool,
    },
    /// The auto-merge interval changed.
    AutoMergeIntervalChanged {
        /// Previous interval in minutes.
        old_minutes: u32,
        /// New interval in minutes.
        new_minutes: u32,
    },
    /// Build trigger settings were replaced. The token never appears here.
    BuildSettingsChanged {
        /// New trigger URL.
        url: String,
        /// New user name.
        username: String,
    },
}

/// Logs an audit event to the dedicated audit channel as structured JSON.
/// Events use the `audit` target, so a subscriber can route them to a
/// separate sink.
pub fn log_audit(event: &AuditEvent) {
    let span = info_span!(target: "audit", "audit_event");
    let _enter = span.enter();

    let json = serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    info!(target: "audit", audit_json = %json, "Audit event");
}
