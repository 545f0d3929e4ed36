//! Record merging.
//!
//! Two collections of the same kind are merged by id. When both sides hold a
//! record with the same id, the one with the strictly greater
//! [`Record::freshness`] wins; on an exact tie the remote version is kept.
//! Fields inside a record are never combined.

use std::collections::HashMap;
use stellar_sync_types::{Record, RecordKind, Snapshot};

/// Merge one collection of local records into the remote collection.
///
/// Output order: remote records in their original order, followed by
/// local-only records in local order. Callers must not rely on it.
pub fn merge_records(local: &[Record], remote: &[Record]) -> Vec<Record> {
    let mut merged: Vec<Record> = Vec::with_capacity(local.len() + remote.len());
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(local.len() + remote.len());

    for record in remote {
        match slots.get(record.id.as_str()) {
            // Duplicate id inside the remote collection: last one wins.
            Some(&slot) => merged[slot] = record.clone(),
            None => {
                slots.insert(record.id.as_str(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    for record in local {
        match slots.get(record.id.as_str()) {
            Some(&slot) => {
                if record.freshness() > merged[slot].freshness() {
                    merged[slot] = record.clone();
                }
            }
            None => {
                slots.insert(record.id.as_str(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    merged
}

/// Merge every record kind independently.
pub fn merge_snapshots(local: &Snapshot, remote: &Snapshot) -> Snapshot {
    let mut merged = Snapshot::new();
    for kind in RecordKind::ALL {
        *merged.records_mut(kind) = merge_records(local.records(kind), remote.records(kind));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn task(id: &str, created: u64) -> Record {
        Record::new(id).with_created_at(created)
    }

    fn ids(records: &[Record]) -> BTreeSet<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    fn by_id(records: &[Record]) -> BTreeMap<String, u64> {
        records
            .iter()
            .map(|r| (r.id.clone(), r.freshness()))
            .collect()
    }

    #[test]
    fn local_only_records_are_added() {
        let local = vec![task("a", 1)];
        let remote = vec![task("b", 2)];

        let merged = merge_records(&local, &remote);

        let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids(&merged), expected);
    }

    #[test]
    fn fresher_local_record_wins() {
        let local = vec![task("a", 10).with_resolved_at(50).with_field("done", true)];
        let remote = vec![task("a", 10)];

        let merged = merge_records(&local, &remote);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].resolved_at, Some(50));
        assert_eq!(merged[0].field("done").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn fresher_remote_record_wins() {
        let local = vec![task("a", 10)];
        let remote = vec![task("a", 10).with_resolved_at(99)];

        let merged = merge_records(&local, &remote);

        assert_eq!(merged[0].resolved_at, Some(99));
    }

    #[test]
    fn tie_keeps_remote_version() {
        let local = vec![task("a", 10).with_field("title", "local")];
        let remote = vec![task("a", 10).with_field("title", "remote")];

        let merged = merge_records(&local, &remote);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].field("title").and_then(|v| v.as_str()), Some("remote"));
    }

    #[test]
    fn records_without_timestamps_tie_at_zero() {
        let local = vec![Record::new("a").with_field("side", "local")];
        let remote = vec![Record::new("a").with_field("side", "remote")];

        let merged = merge_records(&local, &remote);

        assert_eq!(merged[0].field("side").and_then(|v| v.as_str()), Some("remote"));
    }

    #[test]
    fn empty_inputs() {
        assert!(merge_records(&[], &[]).is_empty());
        assert_eq!(merge_records(&[task("a", 1)], &[]).len(), 1);
        assert_eq!(merge_records(&[], &[task("a", 1)]).len(), 1);
    }

    #[test]
    fn kinds_merge_independently() {
        let local = Snapshot {
            todos: vec![task("x", 5)],
            ..Snapshot::default()
        };
        let remote = Snapshot {
            notes: vec![task("x", 1)],
            ..Snapshot::default()
        };

        let merged = merge_snapshots(&local, &remote);

        // Same id in different kinds must not collapse.
        assert_eq!(merged.todos.len(), 1);
        assert_eq!(merged.notes.len(), 1);
        assert_eq!(merged.todos[0].freshness(), 5);
        assert_eq!(merged.notes[0].freshness(), 1);
    }

    /// Collections with unique ids, drawn from a small id space so the two
    /// sides overlap often.
    fn arb_records() -> impl Strategy<Value = Vec<Record>> {
        prop::collection::btree_map("[a-f]", (0u64..20, prop::option::of(0u64..20)), 0..6)
            .prop_map(|entries| {
                entries
                    .into_iter()
                    .map(|(id, (created, resolved))| {
                        let record = Record::new(id).with_created_at(created);
                        match resolved {
                            Some(at) => record.with_resolved_at(at),
                            None => record,
                        }
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn merge_id_set_is_symmetric(a in arb_records(), b in arb_records()) {
            prop_assert_eq!(ids(&merge_records(&a, &b)), ids(&merge_records(&b, &a)));
        }

        #[test]
        fn merge_is_idempotent(a in arb_records(), b in arb_records()) {
            let once = merge_records(&a, &b);
            let twice = merge_records(&a, &once);
            prop_assert_eq!(by_id(&once), by_id(&twice));
        }

        #[test]
        fn merge_keeps_max_freshness(a in arb_records(), b in arb_records()) {
            let merged = by_id(&merge_records(&a, &b));
            for record in a.iter().chain(b.iter()) {
                prop_assert!(merged[&record.id] >= record.freshness());
            }
        }

        #[test]
        fn merge_never_drops_ids(a in arb_records(), b in arb_records()) {
            let merged = ids(&merge_records(&a, &b));
            let expected: BTreeSet<String> = ids(&a).union(&ids(&b)).cloned().collect();
            prop_assert_eq!(merged, expected);
        }
    }
}
