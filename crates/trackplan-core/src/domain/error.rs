//! Error taxonomy for planning passes.

use trackplan_ports::{CollaboratorError, MergeFailure};

/// Recoverable failures of a pipeline pass or a tracker call.
///
/// Broken preconditions inside the pipeline are not represented here; they
/// panic.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("reconstruction failed: {0}")]
    Reconstruction(#[source] CollaboratorError),

    #[error("scheduling failed: {0}")]
    Scheduling(#[source] CollaboratorError),

    #[error("could not merge schedule: {0}")]
    Merge(MergeFailure),

    #[error("connection failed: {0}")]
    Connection(#[source] CollaboratorError),

    #[error("tracker metadata unavailable: {0}")]
    Metadata(#[source] CollaboratorError),

    #[error("invalid pipeline policy: {0}")]
    Policy(String),
}

/// Result type for planning operations.
pub type PlanResult<T> = std::result::Result<T, PlanError>;
