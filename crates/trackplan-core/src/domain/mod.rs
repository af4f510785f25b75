//! Domain models for trackplan.
//!
//! - `ConfigurationSnapshot`: immutable normalized settings
//! - `RawReconstruction`: tracker-derived plan awaiting a schedule
//! - `CommittedResult`: last good plan plus the inputs that produced it

pub mod committed;
pub mod error;
pub mod snapshot;

pub use committed::{CommittedResult, RawReconstruction};
pub use error::{PlanError, PlanResult};
pub use snapshot::{ConfigurationSnapshot, ContributorEntry, TrackerSettings};
