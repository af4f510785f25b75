//! Contributor mapping for the scheduling engine.

use std::collections::BTreeMap;

use serde::Serialize;
use trackplan_ports::ContributorRecord;

use crate::domain::ContributorEntry;

/// Prefix for synthetic ids of external contributors.
///
/// Tracker ids have the form `<digits>-<digits>`, so anything starting with
/// a non-digit cannot collide with them.
pub const EXTERNAL_CONTRIBUTOR_ID_PREFIX: &str = "trackplan/external-contributor/";

/// Scheduler records plus the synthetic-id to display-name map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContributorMapping {
    pub records: Vec<ContributorRecord>,
    pub external_names: BTreeMap<String, String>,
}

/// Map UI contributor entries to scheduler records.
///
/// Internal entries keep their tracker id and count as one member. External
/// entries are numbered from 0 in input order; the counter is local to this
/// call, so the same list always yields the same ids. Capacity is per person
/// and does not scale with headcount.
pub fn map_contributors(entries: &[ContributorEntry]) -> ContributorMapping {
    let mut mapping = ContributorMapping::default();
    for entry in entries {
        let (id, num_members) = match entry {
            ContributorEntry::Internal { user_id, .. } => (user_id.clone(), 1),
            ContributorEntry::External {
                name, num_members, ..
            } => {
                let id = external_contributor_id(mapping.external_names.len());
                mapping.external_names.insert(id.clone(), name.clone());
                (id, *num_members)
            }
        };
        mapping.records.push(ContributorRecord {
            id,
            minutes_per_week: 60 * entry.hours_per_week(),
            num_members,
        });
    }
    mapping
}

/// Synthetic id for the `ordinal`-th external contributor.
pub fn external_contributor_id(ordinal: usize) -> String {
    format!("{EXTERNAL_CONTRIBUTOR_ID_PREFIX}{ordinal}")
}

/// Whether `id` was produced by [`external_contributor_id`].
pub fn is_external_contributor_id(id: &str) -> bool {
    id.starts_with(EXTERNAL_CONTRIBUTOR_ID_PREFIX)
}
