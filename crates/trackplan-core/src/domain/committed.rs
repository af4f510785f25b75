//! Pipeline results: the raw reconstruction and the committed plan.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trackplan_ports::{FinalPlan, RawPlan};

use super::snapshot::ConfigurationSnapshot;

/// Tracker-derived plan before scheduling, stamped with the time the
/// reconstruction completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReconstruction {
    pub plan: RawPlan,
    pub completed_at: DateTime<Utc>,
}

/// The last successfully merged plan together with the inputs that
/// produced it.
///
/// Never mutated: a newer pass replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedResult {
    pub plan: FinalPlan,
    /// Snapshot that triggered the pass
    pub snapshot: ConfigurationSnapshot,
    /// When the tracker data the plan is based on was fully read
    pub reconstructed_at: DateTime<Utc>,
    /// Synthetic contributor id to display name. Ids not listed here are
    /// tracker user ids.
    pub external_contributor_names: BTreeMap<String, String>,
}

impl CommittedResult {
    /// Display name for a contributor id in the plan, if it is external.
    pub fn external_name(&self, contributor_id: &str) -> Option<&str> {
        self.external_contributor_names
            .get(contributor_id)
            .map(String::as_str)
    }
}
