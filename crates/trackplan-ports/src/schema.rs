//! Data crossing the collaborator boundary.
//!
//! The tracker and the scheduler are black boxes; these types are the
//! contract the orchestrator needs from them and nothing more.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tracker side
// ---------------------------------------------------------------------------

/// A tracker user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerUser {
    /// Tracker-issued identifier. Always starts with a digit.
    pub id: String,
    pub full_name: String,
}

/// Metadata about the connected tracker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerMetadata {
    /// Base URL this metadata was fetched from
    pub base_url: String,
    /// Length of a work week as configured in the tracker
    pub minutes_per_work_week: u32,
    /// Users known to the tracker
    #[serde(default)]
    pub users: Vec<TrackerUser>,
}

/// A single issue as reconstructed from tracker data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerIssue {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub state: Option<String>,
    /// Values of the custom fields requested via `other_custom_field_ids`
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub remaining_effort_ms: u64,
    #[serde(default)]
    pub remaining_wait_time_ms: u64,
    /// Ids of issues this issue depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub splittable: bool,
}

/// Warning attached to a plan by the reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWarning {
    pub issue_id: Option<String>,
    pub description: String,
}

/// Tracker-derived plan before scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawPlan {
    pub issues: Vec<TrackerIssue>,
    #[serde(default)]
    pub warnings: Vec<PlanWarning>,
}

/// Decides which issues may be split across contributors, based on the
/// value of the issue type field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplittablePredicate {
    pub type_field_id: String,
    pub splittable_type_ids: BTreeSet<String>,
}

impl SplittablePredicate {
    pub fn is_splittable(&self, issue: &TrackerIssue) -> bool {
        issue
            .custom_fields
            .get(&self.type_field_id)
            .is_some_and(|value| self.splittable_type_ids.contains(value))
    }
}

/// Everything the tracker needs to rebuild the issue graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionRequest {
    pub state_field_id: String,
    pub inactive_state_ids: Vec<String>,
    pub remaining_effort_field_id: String,
    pub remaining_wait_field_id: String,
    pub assignee_field_id: String,
    pub other_custom_field_ids: Vec<String>,
    pub depends_link_type_id: String,
    pub does_inward_depend_on_outward: bool,
    pub saved_query_id: String,
    pub overlay_saved_query_id: String,
    /// State changes shorter than this are ignored when reading the activity log
    pub min_state_change_duration_ms: u64,
    /// Used when an issue has no remaining-effort value
    pub default_remaining_effort_ms: u64,
    /// Used when an issue has no wait-time value
    pub default_wait_time_ms: u64,
    pub splittable: SplittablePredicate,
}

// ---------------------------------------------------------------------------
// Scheduler side
// ---------------------------------------------------------------------------

/// A contributor as seen by the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub id: String,
    pub minutes_per_week: u32,
    pub num_members: u32,
}

/// Scheduling parameters for one prediction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingOptions {
    pub contributors: Vec<ContributorRecord>,
    pub minutes_per_week: u32,
    pub resolution_ms: u64,
    /// In resolution units. Shorter issues are neither split nor preempted.
    pub min_activity_duration: u32,
    pub prediction_start: DateTime<Utc>,
}

/// One block of work (or waiting) on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    pub assignee: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub is_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSchedule {
    pub issue_id: String,
    pub activities: Vec<ScheduledActivity>,
}

/// Output of the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub issues: Vec<IssueSchedule>,
}

/// Raw plan merged with a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPlan {
    pub issues: Vec<TrackerIssue>,
    pub schedule: Schedule,
    pub warnings: Vec<PlanWarning>,
    pub prediction_start: DateTime<Utc>,
}

/// Structured "could not merge schedule" value returned by the merge step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeFailure {
    pub message: String,
}

impl MergeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for MergeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// A user-facing failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}
