//! Normalized configuration captured at one instant.

use serde::{Deserialize, Serialize};

/// Everything in the configuration except the contributor list.
///
/// A change to any of these fields invalidates the reconstructed plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub base_url: String,
    pub service_id: String,
    pub state_field_id: String,
    pub inactive_state_ids: Vec<String>,
    pub remaining_effort_field_id: String,
    pub remaining_wait_field_id: String,
    pub assignee_field_id: String,
    pub type_field_id: String,
    pub splittable_type_ids: Vec<String>,
    pub depends_link_type_id: String,
    pub does_inward_depend_on_outward: bool,
    pub saved_query_id: String,
    pub overlay_saved_query_id: String,
}

/// A contributor as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContributorEntry {
    /// Backed by a tracker user account.
    Internal { user_id: String, hours_per_week: u32 },
    /// A named person or group without a tracker account.
    External {
        name: String,
        hours_per_week: u32,
        num_members: u32,
    },
}

impl ContributorEntry {
    pub fn hours_per_week(&self) -> u32 {
        match self {
            ContributorEntry::Internal { hours_per_week, .. }
            | ContributorEntry::External { hours_per_week, .. } => *hours_per_week,
        }
    }
}

/// Immutable, normalized view of the user-editable settings.
///
/// Snapshots compare structurally. Build one with [`ConfigurationSnapshot::capture`]
/// so that cosmetic differences (whitespace, id order) never count as changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub contributors: Vec<ContributorEntry>,
}

impl ConfigurationSnapshot {
    /// Normalize `tracker` and `contributors` into a snapshot.
    pub fn capture(tracker: TrackerSettings, contributors: Vec<ContributorEntry>) -> Self {
        Self {
            tracker,
            contributors,
        }
        .normalized()
    }

    /// Return the normalized form of this snapshot.
    ///
    /// Contributor order is kept: it decides synthetic identifiers.
    pub fn normalized(self) -> Self {
        let t = self.tracker;
        let tracker = TrackerSettings {
            base_url: t.base_url.trim().trim_end_matches('/').to_string(),
            service_id: t.service_id.trim().to_string(),
            state_field_id: t.state_field_id.trim().to_string(),
            inactive_state_ids: normalize_ids(t.inactive_state_ids),
            remaining_effort_field_id: t.remaining_effort_field_id.trim().to_string(),
            remaining_wait_field_id: t.remaining_wait_field_id.trim().to_string(),
            assignee_field_id: t.assignee_field_id.trim().to_string(),
            type_field_id: t.type_field_id.trim().to_string(),
            splittable_type_ids: normalize_ids(t.splittable_type_ids),
            depends_link_type_id: t.depends_link_type_id.trim().to_string(),
            does_inward_depend_on_outward: t.does_inward_depend_on_outward,
            saved_query_id: t.saved_query_id.trim().to_string(),
            overlay_saved_query_id: t.overlay_saved_query_id.trim().to_string(),
        };
        let contributors = self
            .contributors
            .into_iter()
            .map(|entry| match entry {
                ContributorEntry::Internal {
                    user_id,
                    hours_per_week,
                } => ContributorEntry::Internal {
                    user_id: user_id.trim().to_string(),
                    hours_per_week,
                },
                ContributorEntry::External {
                    name,
                    hours_per_week,
                    num_members,
                } => ContributorEntry::External {
                    name: name.trim().to_string(),
                    hours_per_week,
                    num_members,
                },
            })
            .collect();
        Self {
            tracker,
            contributors,
        }
    }

    /// Whether the tracker-facing part of two snapshots differs.
    pub fn tracker_differs(&self, other: &Self) -> bool {
        self.tracker != other.tracker
    }

    /// Whether the contributor lists of two snapshots differ.
    pub fn contributors_differ(&self, other: &Self) -> bool {
        self.contributors != other.contributors
    }
}

fn normalize_ids(ids: Vec<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_trims_and_sorts() {
        let snapshot = ConfigurationSnapshot::capture(
            TrackerSettings {
                base_url: " https://tracker.example/ ".to_string(),
                splittable_type_ids: vec!["b".into(), "a".into(), "b".into(), " ".into()],
                saved_query_id: " 5-1 ".to_string(),
                ..Default::default()
            },
            vec![],
        );
        assert_eq!(snapshot.tracker.base_url, "https://tracker.example");
        assert_eq!(snapshot.tracker.splittable_type_ids, vec!["a", "b"]);
        assert_eq!(snapshot.tracker.saved_query_id, "5-1");
    }

    #[test]
    fn capture_keeps_contributor_order() {
        let snapshot = ConfigurationSnapshot::capture(
            TrackerSettings::default(),
            vec![
                ContributorEntry::External {
                    name: " Agency ".into(),
                    hours_per_week: 20,
                    num_members: 3,
                },
                ContributorEntry::Internal {
                    user_id: "1-4".into(),
                    hours_per_week: 40,
                },
            ],
        );
        assert!(matches!(
            &snapshot.contributors[0],
            ContributorEntry::External { name, .. } if name == "Agency"
        ));
        assert_eq!(snapshot.contributors[1].hours_per_week(), 40);
    }

    #[test]
    fn equivalent_settings_compare_equal() {
        let a = ConfigurationSnapshot::capture(
            TrackerSettings {
                inactive_state_ids: vec!["x".into(), "y".into()],
                ..Default::default()
            },
            vec![],
        );
        let b = ConfigurationSnapshot::capture(
            TrackerSettings {
                inactive_state_ids: vec!["y".into(), "x".into()],
                ..Default::default()
            },
            vec![],
        );
        assert_eq!(a, b);
        assert!(!a.tracker_differs(&b));
    }

    #[test]
    fn contributor_entry_json_is_tagged() {
        let entry: ContributorEntry = serde_json::from_str(
            r#"{"type":"external","name":"Ops","hours_per_week":8,"num_members":2}"#,
        )
        .unwrap();
        assert_eq!(
            entry,
            ContributorEntry::External {
                name: "Ops".into(),
                hours_per_week: 8,
                num_members: 2
            }
        );
    }
}
