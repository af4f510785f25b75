use std::collections::BTreeSet;

use trackplan_core::{is_external_contributor_id, map_contributors, ContributorEntry};

fn mixed_entries(externals: usize) -> Vec<ContributorEntry> {
    let mut entries = Vec::new();
    for i in 0..externals {
        entries.push(ContributorEntry::External {
            name: format!("Agency {i}"),
            hours_per_week: 5 + i as u32,
            num_members: 2,
        });
        entries.push(ContributorEntry::Internal {
            user_id: format!("1-{i}"),
            hours_per_week: 40,
        });
    }
    entries
}

#[test]
fn external_ids_are_distinct_and_prefixed() {
    for n in [0, 1, 2, 7, 25] {
        let entries = mixed_entries(n);
        let mapping = map_contributors(&entries);

        assert_eq!(mapping.records.len(), entries.len());
        assert_eq!(mapping.external_names.len(), n);

        let external_ids: BTreeSet<_> = mapping
            .records
            .iter()
            .filter(|r| is_external_contributor_id(&r.id))
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(external_ids.len(), n);
        assert!(external_ids
            .iter()
            .all(|id| !id.starts_with(|c: char| c.is_ascii_digit())));
        assert_eq!(
            external_ids,
            mapping.external_names.keys().cloned().collect::<BTreeSet<_>>()
        );
    }
}

#[test]
fn internal_ids_pass_through_in_order() {
    let entries = mixed_entries(3);
    let mapping = map_contributors(&entries);
    let internal: Vec<_> = mapping
        .records
        .iter()
        .filter(|r| !is_external_contributor_id(&r.id))
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(internal, vec!["1-0", "1-1", "1-2"]);
}

#[test]
fn mapping_is_deterministic() {
    let entries = mixed_entries(4);
    let first = map_contributors(&entries);
    let second = map_contributors(&entries);
    assert_eq!(first.records, second.records);
    assert_eq!(first.external_names, second.external_names);
}
