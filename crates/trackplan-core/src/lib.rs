//! trackplan core library
//!
//! Decides what a project-plan session should do next and does it:
//! the action state machine, contributor mapping, the two-phase plan
//! pipeline and the orchestrator that ties them together.

pub mod action;
pub mod alerts;
pub mod contributors;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod pipeline;
pub mod policy;
pub mod telemetry;

pub use action::{next_action, Action};
pub use alerts::TracingAlertSink;
pub use contributors::{
    external_contributor_id, is_external_contributor_id, map_contributors, ContributorMapping,
    EXTERNAL_CONTRIBUTOR_ID_PREFIX,
};
pub use domain::{
    CommittedResult, ConfigurationSnapshot, ContributorEntry, PlanError, PlanResult,
    RawReconstruction, TrackerSettings,
};
pub use orchestrator::{
    Orchestrator, OrchestratorState, BUILD_PLAN_FAILED, CONNECT_FAILED, METADATA_FAILED,
    UPDATE_PREDICTION_FAILED,
};
pub use pipeline::PipelineRunner;
pub use policy::PipelinePolicy;
