//! Merge job domain types.
//!
//! A [`MergeJob`] is a daily intent to merge one branch into another at a
//! fixed wall-clock time. Unknown attributes submitted by callers are kept in
//! [`MergeJob::extra`] and written back verbatim.

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static TIME_OF_DAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("time-of-day pattern is valid")
});

/// Keys owned by [`MergeJob`] that must never leak into the extras map.
const RESERVED_KEYS: [&str; 4] = ["id", "source_branch", "target_branch", "time"];

/// Errors raised by the schedule registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The submitted time is not a 24-hour `HH:MM` value.
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),
    /// A required branch field was missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// No job exists with the given id.
    #[error("Configuration not found: {0}")]
    NotFound(JobId),
}

/// Opaque merge job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock time of day with minute precision, always rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Parses a 24-hour `HH:MM` value. A single-digit hour is accepted and
    /// normalized (`9:05` becomes `09:05`); minutes always need two digits.
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeFormat`] for anything else.
    pub fn parse(input: &str) -> Result<Self, ScheduleError> {
        let captures = TIME_OF_DAY_PATTERN
            .captures(input.trim())
            .ok_or_else(|| ScheduleError::InvalidTimeFormat(input.to_string()))?;
        let hour = captures[1]
            .parse()
            .map_err(|_| ScheduleError::InvalidTimeFormat(input.to_string()))?;
        let minute = captures[2]
            .parse()
            .map_err(|_| ScheduleError::InvalidTimeFormat(input.to_string()))?;
        Ok(Self { hour, minute })
    }

    /// Hour component (0-23).
    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    /// Minute component (0-59).
    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }

    /// Converts to a [`NaiveTime`] at second zero.
    #[must_use]
    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A source/target branch pair to merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchPair {
    /// Branch whose commits are merged.
    pub source: String,
    /// Branch that receives the merge and is pushed.
    pub target: String,
}

impl BranchPair {
    /// Creates a new pair.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for BranchPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A scheduled daily merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeJob {
    /// Registry-assigned identifier.
    pub id: JobId,
    /// Branch merged from.
    pub source_branch: String,
    /// Branch merged into.
    pub target_branch: String,
    /// Daily trigger time.
    pub time: TimeOfDay,
    /// Caller-supplied attributes preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MergeJob {
    /// The branch pair this job merges.
    #[must_use]
    pub fn pair(&self) -> BranchPair {
        BranchPair::new(&self.source_branch, &self.target_branch)
    }
}

/// A job as submitted by a caller, before validation and id assignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMergeJob {
    /// Branch merged from.
    #[serde(default)]
    pub source_branch: String,
    /// Branch merged into.
    #[serde(default)]
    pub target_branch: String,
    /// Requested time, validated as `HH:MM`.
    #[serde(default)]
    pub time: String,
    /// Any other attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewMergeJob {
    /// Convenience constructor without extras.
    pub fn new(
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            time: time.into(),
            extra: Map::new(),
        }
    }

    /// Validates the submission and assigns an id.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeFormat`] or
    /// [`ScheduleError::MissingField`] without consuming any state.
    pub fn into_job(self, id: JobId) -> Result<MergeJob, ScheduleError> {
        let time = TimeOfDay::parse(&self.time)?;
        if self.source_branch.trim().is_empty() {
            return Err(ScheduleError::MissingField("source_branch"));
        }
        if self.target_branch.trim().is_empty() {
            return Err(ScheduleError::MissingField("target_branch"));
        }

        let mut extra = self.extra;
        for key in RESERVED_KEYS {
            extra.remove(key);
        }

        Ok(MergeJob {
            id,
            source_branch: self.source_branch,
            target_branch: self.target_branch,
            time,
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_accepts_valid_values() {
        for input in ["00:00", "09:00", "12:34", "23:59"] {
            let parsed = TimeOfDay::parse(input).unwrap();
            assert_eq!(parsed.to_string(), input);
        }
    }

    #[test]
    fn test_time_of_day_pads_single_digit_hour() {
        assert_eq!(TimeOfDay::parse("9:05").unwrap().to_string(), "09:05");
        assert_eq!(TimeOfDay::parse("0:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn test_time_of_day_trims_whitespace() {
        assert_eq!(TimeOfDay::parse(" 07:30 ").unwrap().to_string(), "07:30");
    }

    #[test]
    fn test_time_of_day_rejects_malformed_values() {
        for input in ["25:00", "9:5", "123:00", "abc", "", "24:00", "12:60", "12:3a", "12-30"] {
            assert!(
                matches!(TimeOfDay::parse(input), Err(ScheduleError::InvalidTimeFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_time_of_day_serializes_as_string() {
        let time = TimeOfDay::parse("08:05").unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"08:05\"");
        let back: TimeOfDay = serde_json::from_str("\"08:05\"").unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<TimeOfDay>("\"8:5\"").is_err());
        let padded: TimeOfDay = serde_json::from_str("\"8:05\"").unwrap();
        assert_eq!(padded.to_string(), "08:05");
    }

    #[test]
    fn test_into_job_preserves_extras_and_drops_reserved_keys() {
        let json = r#"{
            "source_branch": "dev",
            "target_branch": "main",
            "time": "09:00",
            "id": "caller-chosen",
            "note": "nightly",
            "owner": {"team": "core"}
        }"#;
        let submitted: NewMergeJob = serde_json::from_str(json).unwrap();
        let job = submitted.into_job(JobId::from("generated".to_string())).unwrap();

        assert_eq!(job.id.as_str(), "generated");
        assert_eq!(job.extra.get("note"), Some(&Value::from("nightly")));
        assert!(job.extra.contains_key("owner"));
        assert!(!job.extra.contains_key("id"));

        let rendered = serde_json::to_value(&job).unwrap();
        assert_eq!(rendered["id"], "generated");
        assert_eq!(rendered["time"], "09:00");
        assert_eq!(rendered["owner"]["team"], "core");
    }

    #[test]
    fn test_into_job_requires_branches() {
        let err = NewMergeJob::new("", "main", "09:00")
            .into_job(JobId::generate())
            .unwrap_err();
        assert_eq!(err, ScheduleError::MissingField("source_branch"));

        let err = NewMergeJob::new("dev", "  ", "09:00")
            .into_job(JobId::generate())
            .unwrap_err();
        assert_eq!(err, ScheduleError::MissingField("target_branch"));
    }

    #[test]
    fn test_into_job_checks_time_first() {
        let err = NewMergeJob::new("", "", "nope")
            .into_job(JobId::generate())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTimeFormat(_)));
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(JobId::generate(), JobId::generate());
    }
}
