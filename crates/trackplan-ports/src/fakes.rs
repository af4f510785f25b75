//! In-memory fakes for collaborator traits (testing only)
//!
//! Provides `ScriptedTracker`, `ScriptedScheduler` and `MemoryAlertSink`
//! that satisfy the trait contracts with queued responses and record every
//! call for later assertions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::collaborator_traits::*;
use crate::error::CollaboratorError;
use crate::schema::*;

// ---------------------------------------------------------------------------
// ScriptedTracker
// ---------------------------------------------------------------------------

/// Tracker fake serving queued metadata and reconstruction results.
///
/// An empty metadata or reconstruction queue answers with
/// `CollaboratorError::InvalidData`.
#[derive(Default)]
pub struct ScriptedTracker {
    connect_failures: Mutex<VecDeque<CollaboratorError>>,
    metadata: Mutex<VecDeque<CollaboratorResult<TrackerMetadata>>>,
    reconstructions: Mutex<VecDeque<CollaboratorResult<RawPlan>>>,
    progress_steps: Mutex<Vec<f64>>,
    gate: Mutex<Option<Arc<Notify>>>,
    connect_gate: Mutex<Option<Arc<Notify>>>,
    connect_calls: Mutex<Vec<(String, String)>>,
    metadata_calls: Mutex<Vec<String>>,
    reconstruct_calls: Mutex<Vec<ReconstructionRequest>>,
}

impl ScriptedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next handshake. Handshakes succeed otherwise.
    pub fn push_connect_failure(&self, err: CollaboratorError) {
        self.connect_failures.lock().unwrap().push_back(err);
    }

    pub fn push_metadata(&self, metadata: TrackerMetadata) {
        self.metadata.lock().unwrap().push_back(Ok(metadata));
    }

    pub fn push_metadata_failure(&self, err: CollaboratorError) {
        self.metadata.lock().unwrap().push_back(Err(err));
    }

    pub fn push_plan(&self, plan: RawPlan) {
        self.reconstructions.lock().unwrap().push_back(Ok(plan));
    }

    pub fn push_reconstruction_failure(&self, err: CollaboratorError) {
        self.reconstructions.lock().unwrap().push_back(Err(err));
    }

    /// Fractions reported through `on_progress` on every reconstruction.
    pub fn set_progress_steps(&self, steps: Vec<f64>) {
        *self.progress_steps.lock().unwrap() = steps;
    }

    /// Make every reconstruction wait until the returned handle is notified.
    pub fn hold_reconstructions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    /// Make every handshake wait until the returned handle is notified.
    pub fn hold_connections(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.connect_gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn connect_calls(&self) -> Vec<(String, String)> {
        self.connect_calls.lock().unwrap().clone()
    }

    pub fn metadata_calls(&self) -> Vec<String> {
        self.metadata_calls.lock().unwrap().clone()
    }

    pub fn reconstruct_calls(&self) -> Vec<ReconstructionRequest> {
        self.reconstruct_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackerClient for ScriptedTracker {
    async fn connect(&self, base_url: &str, service_id: &str) -> CollaboratorResult<()> {
        self.connect_calls
            .lock()
            .unwrap()
            .push((base_url.to_string(), service_id.to_string()));

        let gate = self.connect_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.connect_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn fetch_metadata(&self, base_url: &str) -> CollaboratorResult<TrackerMetadata> {
        self.metadata_calls.lock().unwrap().push(base_url.to_string());
        self.metadata
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::InvalidData("no scripted metadata".into())))
    }

    async fn reconstruct(
        &self,
        _base_url: &str,
        request: &ReconstructionRequest,
        on_progress: ProgressFn<'_>,
    ) -> CollaboratorResult<RawPlan> {
        self.reconstruct_calls.lock().unwrap().push(request.clone());

        let steps = self.progress_steps.lock().unwrap().clone();
        for fraction in steps {
            on_progress(fraction);
        }

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.reconstructions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CollaboratorError::InvalidData(
                    "no scripted reconstruction".into(),
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// ScriptedScheduler
// ---------------------------------------------------------------------------

/// Scheduler fake.
///
/// With empty queues, `schedule` returns an empty schedule and
/// `merge_schedule` joins the raw plan with whatever schedule it is given.
#[derive(Debug, Default)]
pub struct ScriptedScheduler {
    schedules: Mutex<VecDeque<CollaboratorResult<Schedule>>>,
    merges: Mutex<VecDeque<Result<FinalPlan, MergeFailure>>>,
    schedule_calls: Mutex<Vec<(usize, SchedulingOptions)>>,
    merge_calls: Mutex<Vec<DateTime<Utc>>>,
}

impl ScriptedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_schedule(&self, schedule: Schedule) {
        self.schedules.lock().unwrap().push_back(Ok(schedule));
    }

    pub fn push_schedule_failure(&self, err: CollaboratorError) {
        self.schedules.lock().unwrap().push_back(Err(err));
    }

    pub fn push_merge_failure(&self, failure: MergeFailure) {
        self.merges.lock().unwrap().push_back(Err(failure));
    }

    /// Issue count and options of every `schedule` call.
    pub fn schedule_calls(&self) -> Vec<(usize, SchedulingOptions)> {
        self.schedule_calls.lock().unwrap().clone()
    }

    /// Prediction start of every `merge_schedule` call.
    pub fn merge_calls(&self) -> Vec<DateTime<Utc>> {
        self.merge_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchedulingEngine for ScriptedScheduler {
    async fn schedule(
        &self,
        issues: &[TrackerIssue],
        options: &SchedulingOptions,
    ) -> CollaboratorResult<Schedule> {
        self.schedule_calls
            .lock()
            .unwrap()
            .push((issues.len(), options.clone()));
        self.schedules
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Schedule::default()))
    }

    fn merge_schedule(
        &self,
        raw: &RawPlan,
        schedule: &Schedule,
        prediction_start: DateTime<Utc>,
    ) -> Result<FinalPlan, MergeFailure> {
        self.merge_calls.lock().unwrap().push(prediction_start);
        self.merges.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(FinalPlan {
                issues: raw.issues.clone(),
                schedule: schedule.clone(),
                warnings: raw.warnings.clone(),
                prediction_start,
            })
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryAlertSink
// ---------------------------------------------------------------------------

/// Collects alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.title.clone())
            .collect()
    }
}

impl AlertSink for MemoryAlertSink {
    fn alert(&self, alert: Alert) {
        self.alerts.lock().unwrap().push(alert);
    }
}
