//! Collaborator trait definitions for trackplan
//!
//! These traits define the external operations the orchestrator consumes:
//! - `TrackerClient`: handshake, metadata and plan reconstruction
//! - `SchedulingEngine`: scheduling and merging a schedule into a plan
//! - `AlertSink`: user-facing failure reports
//!
//! All traits are backend-agnostic. In-memory fakes are provided for
//! testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CollaboratorError;
use crate::schema::{
    Alert, FinalPlan, MergeFailure, RawPlan, ReconstructionRequest, Schedule, SchedulingOptions,
    TrackerIssue, TrackerMetadata,
};

/// Result type for collaborator calls
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Progress callback handed to long-running reconstructions.
///
/// Receives the completed fraction in `[0, 1]`.
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

// ---------------------------------------------------------------------------
// TrackerClient
// ---------------------------------------------------------------------------

/// Issue-tracker client.
///
/// Guarantees:
/// - `reconstruct` calls `on_progress` with non-decreasing fractions.
/// - `fetch_metadata` returns metadata whose `base_url` is the one asked for.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Start the authorization handshake with the tracker.
    async fn connect(&self, base_url: &str, service_id: &str) -> CollaboratorResult<()>;

    /// Fetch work-week length and users for the tracker at `base_url`.
    async fn fetch_metadata(&self, base_url: &str) -> CollaboratorResult<TrackerMetadata>;

    /// Rebuild the issue graph from the tracker's issues and activity log.
    async fn reconstruct(
        &self,
        base_url: &str,
        request: &ReconstructionRequest,
        on_progress: ProgressFn<'_>,
    ) -> CollaboratorResult<RawPlan>;
}

// ---------------------------------------------------------------------------
// SchedulingEngine
// ---------------------------------------------------------------------------

/// Scheduling engine.
#[async_trait]
pub trait SchedulingEngine: Send + Sync {
    /// Schedule the unresolved issues onto the contributors in `options`.
    async fn schedule(
        &self,
        issues: &[TrackerIssue],
        options: &SchedulingOptions,
    ) -> CollaboratorResult<Schedule>;

    /// Combine a raw plan with its schedule.
    ///
    /// A plan and schedule that do not fit together yield a `MergeFailure`
    /// value rather than an error.
    fn merge_schedule(
        &self,
        raw: &RawPlan,
        schedule: &Schedule,
        prediction_start: DateTime<Utc>,
    ) -> Result<FinalPlan, MergeFailure>;
}

// ---------------------------------------------------------------------------
// AlertSink
// ---------------------------------------------------------------------------

/// Receiver of user-facing failure reports.
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}
