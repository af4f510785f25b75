//! Top-level controller.
//!
//! The orchestrator owns [`OrchestratorState`], recomputes the action after
//! every state change, and turns [`Orchestrator::dispatch`] into the matching
//! effect. It is the only place that catches pipeline and tracker errors:
//! each one becomes an alert, and progress is cleared whatever the outcome.
//!
//! `Action::Stop` is advisory. Nothing is ever cancelled. Reading the action
//! and marking it in flight (`progress` for a pass, `connection_pending` for
//! a handshake) happen under one lock, so concurrent dispatches start at most
//! one pass or handshake.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, Instrument};
use trackplan_ports::{Alert, AlertSink, SchedulingEngine, TrackerClient, TrackerMetadata};
use uuid::Uuid;

use crate::action::{next_action, Action};
use crate::domain::{
    CommittedResult, ConfigurationSnapshot, PlanError, PlanResult, TrackerSettings,
};
use crate::metrics::{PassOutcome, METRICS};
use crate::obs::{
    emit_action_dispatched, emit_metadata_loaded, emit_pass_committed, emit_pass_failed,
    emit_pass_started, pass_span,
};
use crate::pipeline::PipelineRunner;
use crate::policy::PipelinePolicy;

pub const BUILD_PLAN_FAILED: &str = "Failed to build project plan";
pub const UPDATE_PREDICTION_FAILED: &str = "Failed to update prediction";
pub const CONNECT_FAILED: &str = "Failed to connect to tracker";
pub const METADATA_FAILED: &str = "Failed to load tracker metadata";

/// Everything the action depends on.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorState {
    /// Percent done of the pass in flight. `None` when idle.
    pub progress: Option<f64>,
    /// A handshake or metadata fetch is in flight.
    pub connection_pending: bool,
    /// Metadata of the tracker at `settings.tracker.base_url`.
    pub metadata: Option<TrackerMetadata>,
    pub committed: Option<Arc<CommittedResult>>,
    /// Current settings.
    pub settings: ConfigurationSnapshot,
}

impl OrchestratorState {
    pub fn action(&self) -> Action {
        next_action(
            self.progress.is_some(),
            self.connection_pending,
            self.metadata.is_some(),
            self.committed.as_deref(),
            &self.settings,
        )
    }
}

pub struct Orchestrator {
    runner: PipelineRunner,
    tracker: Arc<dyn TrackerClient>,
    alerts: Arc<dyn AlertSink>,
    state: Mutex<OrchestratorState>,
    action_tx: watch::Sender<Action>,
    plan_name: Mutex<String>,
}

impl Orchestrator {
    pub fn new(
        tracker: Arc<dyn TrackerClient>,
        engine: Arc<dyn SchedulingEngine>,
        alerts: Arc<dyn AlertSink>,
        settings: ConfigurationSnapshot,
        policy: PipelinePolicy,
    ) -> Self {
        let state = OrchestratorState {
            settings: settings.normalized(),
            ..Default::default()
        };
        let (action_tx, _) = watch::channel(state.action());
        Self {
            runner: PipelineRunner::new(Arc::clone(&tracker), engine, policy),
            tracker,
            alerts,
            state: Mutex::new(state),
            action_tx,
            plan_name: Mutex::new(String::new()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, OrchestratorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recompute the action and notify subscribers if it changed.
    ///
    /// Called with the state lock held so notifications follow mutation order.
    fn publish(&self, state: &OrchestratorState) {
        let action = state.action();
        self.action_tx.send_if_modified(|current| {
            if *current == action {
                false
            } else {
                *current = action;
                true
            }
        });
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn action(&self) -> Action {
        self.lock_state().action()
    }

    pub fn progress(&self) -> Option<f64> {
        self.lock_state().progress
    }

    pub fn committed(&self) -> Option<Arc<CommittedResult>> {
        self.lock_state().committed.clone()
    }

    pub fn metadata(&self) -> Option<TrackerMetadata> {
        self.lock_state().metadata.clone()
    }

    pub fn settings(&self) -> ConfigurationSnapshot {
        self.lock_state().settings.clone()
    }

    /// Copy of the whole state.
    pub fn state(&self) -> OrchestratorState {
        self.lock_state().clone()
    }

    /// Receiver notified whenever the computed action changes.
    pub fn subscribe(&self) -> watch::Receiver<Action> {
        self.action_tx.subscribe()
    }

    pub fn runner(&self) -> &PipelineRunner {
        &self.runner
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    pub fn set_plan_name(&self, name: impl Into<String>) {
        *self.plan_name.lock().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    /// Window title: `"{app_name}: {plan name}"`, or just `app_name` when
    /// the plan has no name.
    pub fn title(&self, app_name: &str) -> String {
        let plan_name = self.plan_name.lock().unwrap_or_else(PoisonError::into_inner);
        if plan_name.is_empty() {
            app_name.to_string()
        } else {
            format!("{app_name}: {plan_name}")
        }
    }

    // -----------------------------------------------------------------------
    // Write side
    // -----------------------------------------------------------------------

    /// Replace the current settings.
    ///
    /// Metadata fetched for a different base URL is dropped, which sends the
    /// action back to `Connect`.
    pub fn update_settings(&self, settings: ConfigurationSnapshot) {
        let settings = settings.normalized();
        let mut state = self.lock_state();
        if state
            .metadata
            .as_ref()
            .is_some_and(|m| m.base_url != settings.tracker.base_url)
        {
            debug!(base_url = %settings.tracker.base_url, "Tracker changed, dropping metadata");
            state.metadata = None;
        }
        state.settings = settings;
        self.publish(&state);
    }

    /// Fetch metadata for the configured tracker.
    ///
    /// The action is `Stop` while the fetch is in flight. Returns at once if
    /// a handshake or another fetch is already pending.
    pub async fn refresh_metadata(&self) {
        let base_url = {
            let mut state = self.lock_state();
            if state.connection_pending {
                debug!("Metadata fetch already pending");
                return;
            }
            state.connection_pending = true;
            self.publish(&state);
            state.settings.tracker.base_url.clone()
        };
        self.load_metadata(&base_url).await;
    }

    /// Perform the current action and return it.
    pub async fn dispatch(&self) -> Action {
        let (action, settings, metadata) = {
            let mut state = self.lock_state();
            let action = state.action();
            match action {
                Action::Connect => state.connection_pending = true,
                Action::BuildPlan | Action::UpdatePrediction => state.progress = Some(0.0),
                Action::Stop | Action::Nothing => {}
            }
            self.publish(&state);
            (action, state.settings.clone(), state.metadata.clone())
        };
        emit_action_dispatched(action);

        match action {
            Action::Connect => self.connect(&settings.tracker).await,
            Action::BuildPlan | Action::UpdatePrediction => {
                let pass_id = Uuid::new_v4().to_string();
                self.run_pass(&pass_id, action, settings, metadata)
                    .instrument(pass_span(&pass_id, action))
                    .await
            }
            Action::Stop | Action::Nothing => {}
        }
        action
    }

    /// Handshake followed by a metadata fetch. Expects `connection_pending`
    /// to be set by the caller.
    async fn connect(&self, tracker: &TrackerSettings) {
        if let Err(err) = self
            .tracker
            .connect(&tracker.base_url, &tracker.service_id)
            .await
        {
            {
                let mut state = self.lock_state();
                state.connection_pending = false;
                self.publish(&state);
            }
            self.report(CONNECT_FAILED, &PlanError::Connection(err));
            return;
        }
        self.load_metadata(&tracker.base_url).await;
    }

    /// Fetch metadata for `base_url` and clear `connection_pending`.
    ///
    /// A result for a base URL that is no longer configured is discarded.
    async fn load_metadata(&self, base_url: &str) {
        let outcome = self.tracker.fetch_metadata(base_url).await;

        let failure = {
            let mut state = self.lock_state();
            state.connection_pending = false;
            let failure = match outcome {
                Ok(metadata) if state.settings.tracker.base_url == base_url => {
                    emit_metadata_loaded(
                        &metadata.base_url,
                        metadata.minutes_per_work_week,
                        metadata.users.len(),
                    );
                    state.metadata = Some(metadata);
                    None
                }
                Ok(_) => {
                    debug!(base_url = %base_url, "Discarding metadata for a previous tracker");
                    None
                }
                Err(err) => Some(PlanError::Metadata(err)),
            };
            self.publish(&state);
            failure
        };

        if let Some(err) = failure {
            self.report(METADATA_FAILED, &err);
        }
    }

    async fn run_pass(
        &self,
        pass_id: &str,
        action: Action,
        settings: ConfigurationSnapshot,
        metadata: Option<TrackerMetadata>,
    ) {
        let start = Instant::now();
        emit_pass_started(pass_id, action, settings.contributors.len());

        let on_progress = |fraction: f64| self.set_progress(fraction);
        let (outcome, title) = if action == Action::BuildPlan {
            let outcome = self
                .runner
                .run_build(&settings, metadata.as_ref(), &on_progress)
                .await;
            (outcome, BUILD_PLAN_FAILED)
        } else {
            let outcome = self
                .runner
                .run_update_prediction(&settings, metadata.as_ref())
                .await;
            (outcome, UPDATE_PREDICTION_FAILED)
        };

        self.finish_pass(pass_id, action, title, outcome, start);
    }

    fn set_progress(&self, fraction: f64) {
        let mut state = self.lock_state();
        if state.progress.is_some() {
            state.progress = Some((fraction * 100.0).clamp(0.0, 100.0));
        }
    }

    /// Commit or report the outcome of a pass and clear progress.
    fn finish_pass(
        &self,
        pass_id: &str,
        action: Action,
        title: &str,
        outcome: PlanResult<CommittedResult>,
        start: Instant,
    ) {
        match outcome {
            Ok(result) => {
                let issues = result.plan.issues.len();
                {
                    let mut state = self.lock_state();
                    state.committed = Some(Arc::new(result));
                    state.progress = None;
                    self.publish(&state);
                }
                METRICS.record_pass(action, PassOutcome::Committed);
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                emit_pass_committed(pass_id, issues, duration_ms);
            }
            Err(err) => {
                {
                    let mut state = self.lock_state();
                    state.progress = None;
                    self.publish(&state);
                }
                METRICS.record_pass(action, PassOutcome::Failed);
                emit_pass_failed(pass_id, title, &err);
                self.report(title, &err);
            }
        }
    }

    fn report(&self, title: &str, err: &PlanError) {
        METRICS.record_alert();
        self.alerts.alert(Alert::new(title, err.to_string()));
    }
}
