//! Fixed policy constants of the plan pipeline.
//!
//! The defaults are what every deployment uses unless a policy file says
//! otherwise:
//!
//! ```toml
//! min_state_change_duration_ms = 3600000
//! default_remaining_effort_ms = 0
//! default_wait_time_ms = 0
//! resolution_ms = 3600000
//! min_activity_duration = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{PlanError, PlanResult};

const HOUR_MS: u64 = 60 * 60 * 1000;

/// Constants handed to the reconstruction and the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelinePolicy {
    /// State changes shorter than this are ignored.
    pub min_state_change_duration_ms: u64,
    pub default_remaining_effort_ms: u64,
    pub default_wait_time_ms: u64,
    /// Scheduling time resolution.
    pub resolution_ms: u64,
    /// In resolution units. Shorter issues are neither split across
    /// contributors nor interrupted.
    pub min_activity_duration: u32,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            min_state_change_duration_ms: HOUR_MS,
            default_remaining_effort_ms: 0,
            default_wait_time_ms: 0,
            resolution_ms: HOUR_MS,
            min_activity_duration: 4,
        }
    }
}

impl PipelinePolicy {
    /// Parse a policy from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> PlanResult<Self> {
        let policy: PipelinePolicy =
            toml::from_str(input).map_err(|e| PlanError::Policy(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read and parse a TOML policy file.
    pub fn load(path: &Path) -> PlanResult<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Policy(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.resolution_ms == 0 {
            return Err(PlanError::Policy("resolution_ms must be positive".into()));
        }
        if self.min_activity_duration == 0 {
            return Err(PlanError::Policy(
                "min_activity_duration must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
