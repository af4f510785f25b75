//! trackplan-ports: collaborator contracts for trackplan
//!
//! The orchestrator depends on three external collaborators: an issue
//! tracker, a scheduling engine and an alert sink. This crate defines the
//! traits it consumes, the data that crosses them, and two sets of
//! implementations that need no network:
//!
//! - `fakes`: scripted in-memory collaborators for tests
//! - `recorded`: collaborators serving JSON exports from disk

pub mod collaborator_traits;
mod error;
pub mod fakes;
pub mod recorded;
pub mod schema;

pub use collaborator_traits::{
    AlertSink, CollaboratorResult, ProgressFn, SchedulingEngine, TrackerClient,
};
pub use error::CollaboratorError;
pub use recorded::{RecordedScheduler, RecordedTracker, TrackerExport};
pub use schema::{
    Alert, ContributorRecord, FinalPlan, IssueSchedule, MergeFailure, PlanWarning, RawPlan,
    ReconstructionRequest, Schedule, ScheduledActivity, SchedulingOptions, SplittablePredicate,
    TrackerIssue, TrackerMetadata, TrackerUser,
};
