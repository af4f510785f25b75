//! Two-phase plan pipeline.
//!
//! Phase A reconstructs the issue graph from the tracker. Phase B maps
//! contributors, schedules the reconstructed issues and merges the schedule
//! into the plan. [`PipelineRunner::run_build`] runs A then B as a strict
//! sequence; [`PipelineRunner::run_update_prediction`] runs B alone on the
//! reconstruction left by the last successful A.
//!
//! Neither phase catches collaborator errors. They propagate to the caller,
//! which is the single place that reports them.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use trackplan_ports::{
    ContributorRecord, ProgressFn, ReconstructionRequest, SchedulingEngine, SchedulingOptions,
    SplittablePredicate, TrackerClient, TrackerMetadata,
};

use crate::contributors::map_contributors;
use crate::domain::{
    CommittedResult, ConfigurationSnapshot, PlanError, PlanResult, RawReconstruction,
};
use crate::policy::PipelinePolicy;

/// Runs reconstruction and prediction against injected collaborators.
pub struct PipelineRunner {
    tracker: Arc<dyn TrackerClient>,
    engine: Arc<dyn SchedulingEngine>,
    policy: PipelinePolicy,
    raw: Mutex<Option<Arc<RawReconstruction>>>,
}

impl PipelineRunner {
    pub fn new(
        tracker: Arc<dyn TrackerClient>,
        engine: Arc<dyn SchedulingEngine>,
        policy: PipelinePolicy,
    ) -> Self {
        Self {
            tracker,
            engine,
            policy,
            raw: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &PipelinePolicy {
        &self.policy
    }

    /// Reconstruction left by the last successful Phase A, if any.
    pub fn raw_reconstruction(&self) -> Option<Arc<RawReconstruction>> {
        self.raw_slot().clone()
    }

    fn raw_slot(&self) -> MutexGuard<'_, Option<Arc<RawReconstruction>>> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Translate the tracker-facing settings into a reconstruction request.
    pub fn reconstruction_request(&self, snapshot: &ConfigurationSnapshot) -> ReconstructionRequest {
        let t = &snapshot.tracker;
        ReconstructionRequest {
            state_field_id: t.state_field_id.clone(),
            inactive_state_ids: t.inactive_state_ids.clone(),
            remaining_effort_field_id: t.remaining_effort_field_id.clone(),
            remaining_wait_field_id: t.remaining_wait_field_id.clone(),
            assignee_field_id: t.assignee_field_id.clone(),
            other_custom_field_ids: vec![t.type_field_id.clone()],
            depends_link_type_id: t.depends_link_type_id.clone(),
            does_inward_depend_on_outward: t.does_inward_depend_on_outward,
            saved_query_id: t.saved_query_id.clone(),
            overlay_saved_query_id: t.overlay_saved_query_id.clone(),
            min_state_change_duration_ms: self.policy.min_state_change_duration_ms,
            default_remaining_effort_ms: self.policy.default_remaining_effort_ms,
            default_wait_time_ms: self.policy.default_wait_time_ms,
            splittable: SplittablePredicate {
                type_field_id: t.type_field_id.clone(),
                splittable_type_ids: t.splittable_type_ids.iter().cloned().collect::<BTreeSet<_>>(),
            },
        }
    }

    /// Scheduling options for one prediction pass.
    pub fn scheduling_options(
        &self,
        contributors: Vec<ContributorRecord>,
        metadata: &TrackerMetadata,
        prediction_start: DateTime<Utc>,
    ) -> SchedulingOptions {
        SchedulingOptions {
            contributors,
            minutes_per_week: metadata.minutes_per_work_week,
            resolution_ms: self.policy.resolution_ms,
            min_activity_duration: self.policy.min_activity_duration,
            prediction_start,
        }
    }

    /// Phase A: rebuild the issue graph.
    ///
    /// On success the new reconstruction replaces the stored one. On failure
    /// the stored one is left as it was.
    #[instrument(skip_all, fields(base_url = %snapshot.tracker.base_url))]
    pub async fn reconstruct(
        &self,
        snapshot: &ConfigurationSnapshot,
        on_progress: ProgressFn<'_>,
    ) -> PlanResult<Arc<RawReconstruction>> {
        let request = self.reconstruction_request(snapshot);
        debug!(saved_query = %request.saved_query_id, "Requesting reconstruction");

        let plan = self
            .tracker
            .reconstruct(&snapshot.tracker.base_url, &request, on_progress)
            .await
            .map_err(PlanError::Reconstruction)?;

        let raw = Arc::new(RawReconstruction {
            plan,
            completed_at: Utc::now(),
        });
        *self.raw_slot() = Some(Arc::clone(&raw));

        info!(
            issues = raw.plan.issues.len(),
            warnings = raw.plan.warnings.len(),
            "Reconstruction complete"
        );
        Ok(raw)
    }

    /// Phase B: schedule the stored reconstruction and merge the result.
    ///
    /// # Panics
    ///
    /// If no reconstruction is stored or `metadata` is `None`. Callers only
    /// offer a prediction after a successful reconstruction with a connected
    /// tracker, so either case is a bug.
    pub async fn predict(
        &self,
        snapshot: &ConfigurationSnapshot,
        metadata: Option<&TrackerMetadata>,
    ) -> PlanResult<CommittedResult> {
        let raw = self
            .raw_reconstruction()
            .expect("prediction requires a completed reconstruction");
        self.predict_on(&raw, snapshot, metadata).await
    }

    #[instrument(skip_all, fields(contributors = snapshot.contributors.len()))]
    async fn predict_on(
        &self,
        raw: &RawReconstruction,
        snapshot: &ConfigurationSnapshot,
        metadata: Option<&TrackerMetadata>,
    ) -> PlanResult<CommittedResult> {
        let metadata = metadata.expect("prediction requires tracker metadata");

        let mapping = map_contributors(&snapshot.contributors);
        let options = self.scheduling_options(mapping.records, metadata, raw.completed_at);

        let schedule = self
            .engine
            .schedule(&raw.plan.issues, &options)
            .await
            .map_err(PlanError::Scheduling)?;
        debug!(scheduled = schedule.issues.len(), "Schedule received");

        let plan = self
            .engine
            .merge_schedule(&raw.plan, &schedule, options.prediction_start)
            .map_err(PlanError::Merge)?;

        Ok(CommittedResult {
            plan,
            snapshot: snapshot.clone(),
            reconstructed_at: raw.completed_at,
            external_contributor_names: mapping.external_names,
        })
    }

    /// Full rebuild: Phase A followed by Phase B.
    pub async fn run_build(
        &self,
        snapshot: &ConfigurationSnapshot,
        metadata: Option<&TrackerMetadata>,
        on_progress: ProgressFn<'_>,
    ) -> PlanResult<CommittedResult> {
        let raw = self.reconstruct(snapshot, on_progress).await?;
        self.predict_on(&raw, snapshot, metadata).await
    }

    /// Re-prediction on the stored reconstruction.
    pub async fn run_update_prediction(
        &self,
        snapshot: &ConfigurationSnapshot,
        metadata: Option<&TrackerMetadata>,
    ) -> PlanResult<CommittedResult> {
        self.predict(snapshot, metadata).await
    }
}
