//! Observability tests for planning passes.
//!
//! These tests verify that lifecycle events are emitted with their
//! structured fields and that a dispatched pass logs inside its span.

use std::sync::Arc;

use tracing::Instrument;
use trackplan_core::obs::{
    emit_action_dispatched, emit_metadata_loaded, emit_pass_committed, emit_pass_failed,
    emit_pass_started, pass_span,
};
use trackplan_core::{
    Action, ConfigurationSnapshot, Orchestrator, PipelinePolicy, TrackerSettings,
    TracingAlertSink,
};
use trackplan_ports::fakes::{ScriptedScheduler, ScriptedTracker};
use trackplan_ports::{CollaboratorError, RawPlan, TrackerMetadata};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn action_dispatched_logs_label() {
    emit_action_dispatched(Action::UpdatePrediction);
    assert!(logs_contain("action.dispatched"));
    assert!(logs_contain("update"));
}

#[traced_test]
#[test]
fn pass_lifecycle_events_carry_pass_id() {
    emit_pass_started("pass-42", Action::BuildPlan, 3);
    emit_pass_committed("pass-42", 17, 250);
    assert!(logs_contain("pass.started"));
    assert!(logs_contain("pass.committed"));
    assert!(logs_contain("pass-42"));
}

#[traced_test]
#[test]
fn pass_failure_is_a_warning() {
    emit_pass_failed("pass-err", "Failed to build project plan", &"token expired");
    assert!(logs_contain("WARN"));
    assert!(logs_contain("token expired"));
}

#[traced_test]
#[test]
fn metadata_loaded_logs_base_url() {
    emit_metadata_loaded("https://tracker.example", 2400, 12);
    assert!(logs_contain("metadata.loaded"));
    assert!(logs_contain("https://tracker.example"));
}

#[tokio::test]
#[traced_test]
async fn events_inside_pass_span_are_attributed() {
    async {
        emit_pass_committed("span-pass", 1, 1);
    }
    .instrument(pass_span("span-pass", Action::BuildPlan))
    .await;
    assert!(logs_contain("trackplan.pass"));
}

#[tokio::test]
#[traced_test]
async fn failed_build_is_logged_and_alerted() {
    let tracker = Arc::new(ScriptedTracker::new());
    tracker.push_metadata(TrackerMetadata {
        base_url: "https://tracker.example".into(),
        minutes_per_work_week: 2400,
        users: vec![],
    });
    tracker.push_reconstruction_failure(CollaboratorError::Transport("gateway timeout".into()));

    let orchestrator = Orchestrator::new(
        tracker.clone(),
        Arc::new(ScriptedScheduler::new()),
        Arc::new(TracingAlertSink),
        ConfigurationSnapshot::capture(
            TrackerSettings {
                base_url: "https://tracker.example".into(),
                ..Default::default()
            },
            vec![],
        ),
        PipelinePolicy::default(),
    );

    orchestrator.dispatch().await;
    orchestrator.dispatch().await;

    assert!(logs_contain("metadata.loaded"));
    assert!(logs_contain("pass.started"));
    assert!(logs_contain("pass.failed"));
    assert!(logs_contain("alert.raised"));
    assert!(logs_contain("gateway timeout"));
}

#[tokio::test]
#[traced_test]
async fn committed_build_is_logged() {
    let tracker = Arc::new(ScriptedTracker::new());
    tracker.push_metadata(TrackerMetadata {
        base_url: "https://tracker.example".into(),
        minutes_per_work_week: 2400,
        users: vec![],
    });
    tracker.push_plan(RawPlan::default());

    let orchestrator = Orchestrator::new(
        tracker,
        Arc::new(ScriptedScheduler::new()),
        Arc::new(TracingAlertSink),
        ConfigurationSnapshot::capture(
            TrackerSettings {
                base_url: "https://tracker.example".into(),
                ..Default::default()
            },
            vec![],
        ),
        PipelinePolicy::default(),
    );

    assert_eq!(orchestrator.dispatch().await, Action::Connect);
    assert_eq!(orchestrator.dispatch().await, Action::BuildPlan);
    assert!(logs_contain("Reconstruction complete"));
    assert!(logs_contain("pass.committed"));
}
