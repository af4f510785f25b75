//! Error types for collaborator calls

use thiserror::Error;

/// Errors raised by the tracker client or the scheduling engine.
///
/// These are the recoverable transport, auth and data failures. They are
/// propagated untouched through both pipeline phases and reported once by
/// the orchestrator.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Network or remote-service failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Missing or rejected credentials
    #[error("not authorized by {base_url}: {reason}")]
    Unauthorized { base_url: String, reason: String },

    /// Remote data could not be interpreted
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Local file access (recorded collaborators)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(err: serde_json::Error) -> Self {
        CollaboratorError::Serialization(err.to_string())
    }
}
