//! Action state machine.
//!
//! [`next_action`] is the single source of truth for what the orchestrator
//! may do next. It is pure: the orchestrator calls it again after every
//! state change.

use serde::{Deserialize, Serialize};

use crate::domain::{CommittedResult, ConfigurationSnapshot};

/// What the orchestrator should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// No tracker metadata yet: run the handshake.
    Connect,
    /// Reconstruct the plan from the tracker, then predict.
    BuildPlan,
    /// Only contributors changed: re-run the prediction.
    UpdatePrediction,
    /// Something is in flight. Advisory only.
    Stop,
    /// The committed result matches the current settings.
    Nothing,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::BuildPlan => "build",
            Action::UpdatePrediction => "update",
            Action::Stop => "stop",
            Action::Nothing => "nothing",
        }
    }

    /// Whether dispatching this action starts a pipeline pass.
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Action::BuildPlan | Action::UpdatePrediction)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decide the next action. First matching rule wins:
///
/// 1. a pass or a metadata fetch is in flight: `Stop`
/// 2. no tracker metadata: `Connect`
/// 3. nothing committed yet: `BuildPlan`
/// 4. tracker-facing settings differ from the committed snapshot: `BuildPlan`
/// 5. only the contributor list differs: `UpdatePrediction`
/// 6. otherwise `Nothing`
pub fn next_action(
    in_progress: bool,
    connection_pending: bool,
    metadata_present: bool,
    committed: Option<&CommittedResult>,
    current: &ConfigurationSnapshot,
) -> Action {
    if in_progress || connection_pending {
        return Action::Stop;
    }
    if !metadata_present {
        return Action::Connect;
    }
    let Some(committed) = committed else {
        return Action::BuildPlan;
    };

    if current.tracker_differs(&committed.snapshot) {
        Action::BuildPlan
    } else if current.contributors_differ(&committed.snapshot) {
        Action::UpdatePrediction
    } else {
        Action::Nothing
    }
}
