//! Trait contract tests for TrackerClient, SchedulingEngine and AlertSink.
//!
//! These tests verify the behavioral contracts of the collaborator traits
//! using the scripted fakes and the recorded implementations.

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::Utc;
use trackplan_ports::collaborator_traits::*;
use trackplan_ports::fakes::{MemoryAlertSink, ScriptedScheduler, ScriptedTracker};
use trackplan_ports::schema::*;
use trackplan_ports::{CollaboratorError, RecordedScheduler, RecordedTracker, TrackerExport};

fn request() -> ReconstructionRequest {
    ReconstructionRequest {
        state_field_id: "state".to_string(),
        inactive_state_ids: vec![],
        remaining_effort_field_id: "effort".to_string(),
        remaining_wait_field_id: "wait".to_string(),
        assignee_field_id: "assignee".to_string(),
        other_custom_field_ids: vec!["type".to_string()],
        depends_link_type_id: "depends".to_string(),
        does_inward_depend_on_outward: false,
        saved_query_id: "q-1".to_string(),
        overlay_saved_query_id: String::new(),
        min_state_change_duration_ms: 3_600_000,
        default_remaining_effort_ms: 0,
        default_wait_time_ms: 0,
        splittable: SplittablePredicate {
            type_field_id: "type".to_string(),
            splittable_type_ids: BTreeSet::from(["feature".to_string()]),
        },
    }
}

fn issue(id: &str, kind: &str) -> TrackerIssue {
    TrackerIssue {
        id: id.to_string(),
        summary: format!("issue {id}"),
        state: Some("open".to_string()),
        custom_fields: [("type".to_string(), kind.to_string())].into(),
        assignee: None,
        remaining_effort_ms: 7_200_000,
        remaining_wait_time_ms: 0,
        dependencies: vec![],
        splittable: false,
    }
}

fn metadata(base_url: &str) -> TrackerMetadata {
    TrackerMetadata {
        base_url: base_url.to_string(),
        minutes_per_work_week: 2400,
        users: vec![TrackerUser {
            id: "1-1".to_string(),
            full_name: "Ada".to_string(),
        }],
    }
}

// ===========================================================================
// ScriptedTracker
// ===========================================================================

#[tokio::test]
async fn scripted_tracker_reports_progress_in_order() {
    let tracker = ScriptedTracker::new();
    tracker.set_progress_steps(vec![0.0, 0.5, 1.0]);
    tracker.push_plan(RawPlan::default());

    let seen = Mutex::new(Vec::new());
    let on_progress = |f: f64| seen.lock().unwrap().push(f);
    tracker
        .reconstruct("https://t.example", &request(), &on_progress)
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0.0, 0.5, 1.0]);
    assert_eq!(tracker.reconstruct_calls().len(), 1);
}

#[tokio::test]
async fn scripted_tracker_empty_queue_is_an_error() {
    let tracker = ScriptedTracker::new();
    let err = tracker
        .reconstruct("https://t.example", &request(), &|_: f64| {})
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::InvalidData(_)));
}

#[tokio::test]
async fn scripted_tracker_records_connect_and_metadata_calls() {
    let tracker = ScriptedTracker::new();
    tracker.push_metadata(metadata("https://t.example"));

    tracker.connect("https://t.example", "svc-1").await.unwrap();
    let meta = tracker.fetch_metadata("https://t.example").await.unwrap();

    assert_eq!(meta.minutes_per_work_week, 2400);
    assert_eq!(
        tracker.connect_calls(),
        vec![("https://t.example".to_string(), "svc-1".to_string())]
    );
    assert_eq!(tracker.metadata_calls(), vec!["https://t.example".to_string()]);
}

#[tokio::test]
async fn scripted_tracker_connect_failure_is_one_shot() {
    let tracker = ScriptedTracker::new();
    tracker.push_connect_failure(CollaboratorError::Transport("refused".into()));

    assert!(tracker.connect("https://t.example", "svc").await.is_err());
    assert!(tracker.connect("https://t.example", "svc").await.is_ok());
    assert_eq!(tracker.connect_calls().len(), 2);
}

// ===========================================================================
// ScriptedScheduler
// ===========================================================================

#[tokio::test]
async fn scripted_scheduler_default_merge_keeps_plan() {
    let scheduler = ScriptedScheduler::new();
    let raw = RawPlan {
        issues: vec![issue("A-1", "bug")],
        warnings: vec![],
    };
    let start = Utc::now();
    let options = SchedulingOptions {
        contributors: vec![],
        minutes_per_week: 2400,
        resolution_ms: 3_600_000,
        min_activity_duration: 4,
        prediction_start: start,
    };

    let schedule = scheduler.schedule(&raw.issues, &options).await.unwrap();
    let plan = scheduler.merge_schedule(&raw, &schedule, start).unwrap();

    assert_eq!(plan.issues, raw.issues);
    assert_eq!(scheduler.schedule_calls()[0].0, 1);
    assert_eq!(scheduler.merge_calls(), vec![start]);
}

#[tokio::test]
async fn scripted_scheduler_serves_merge_failure() {
    let scheduler = ScriptedScheduler::new();
    scheduler.push_merge_failure(MergeFailure::new("overlapping activities"));
    let failure = scheduler
        .merge_schedule(&RawPlan::default(), &Schedule::default(), Utc::now())
        .unwrap_err();
    assert_eq!(failure.message, "overlapping activities");
}

// ===========================================================================
// Recorded collaborators
// ===========================================================================

#[tokio::test]
async fn recorded_tracker_marks_splittable_issues() {
    let tracker = RecordedTracker::new(TrackerExport {
        metadata: metadata("https://t.example"),
        plan: RawPlan {
            issues: vec![issue("A-1", "feature"), issue("A-2", "bug")],
            warnings: vec![],
        },
    });

    let plan = tracker
        .reconstruct("https://t.example", &request(), &|_: f64| {})
        .await
        .unwrap();

    assert!(plan.issues[0].splittable);
    assert!(!plan.issues[1].splittable);
}

#[tokio::test]
async fn recorded_tracker_rejects_other_base_url() {
    let tracker = RecordedTracker::new(TrackerExport {
        metadata: metadata("https://t.example"),
        plan: RawPlan::default(),
    });
    let err = tracker.fetch_metadata("https://other.example").await.unwrap_err();
    assert!(matches!(err, CollaboratorError::Unauthorized { .. }));
}

#[tokio::test]
async fn recorded_collaborators_load_from_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("export.json");
    let schedule_path = dir.path().join("schedule.json");

    let export = TrackerExport {
        metadata: metadata("https://t.example"),
        plan: RawPlan {
            issues: vec![issue("A-1", "bug")],
            warnings: vec![],
        },
    };
    std::fs::write(&export_path, serde_json::to_vec(&export).unwrap()).unwrap();
    std::fs::write(
        &schedule_path,
        serde_json::to_vec(&Schedule::default()).unwrap(),
    )
    .unwrap();

    let tracker = RecordedTracker::load(&export_path).await.unwrap();
    let scheduler = RecordedScheduler::load(&schedule_path).await.unwrap();

    let meta = tracker.fetch_metadata("https://t.example").await.unwrap();
    assert_eq!(meta.users.len(), 1);
    let options = SchedulingOptions {
        contributors: vec![],
        minutes_per_week: meta.minutes_per_work_week,
        resolution_ms: 3_600_000,
        min_activity_duration: 4,
        prediction_start: Utc::now(),
    };
    assert!(scheduler.schedule(&[], &options).await.unwrap().issues.is_empty());
}

#[tokio::test]
async fn recorded_tracker_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RecordedTracker::load(&dir.path().join("absent.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::Io(_)));
}

// ===========================================================================
// MemoryAlertSink
// ===========================================================================

#[test]
fn memory_alert_sink_keeps_order() {
    let sink = MemoryAlertSink::new();
    sink.alert(Alert::new("first", "a"));
    sink.alert(Alert::new("second", "b"));
    assert_eq!(sink.titles(), vec!["first".to_string(), "second".to_string()]);
}
