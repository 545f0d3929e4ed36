//! Snapshots of local state and the shared room document.

use serde::{Deserialize, Serialize};

use crate::ids::DeviceId;
use crate::record::{Record, RecordKind};

/// The full set of synced collections on one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tasks.
    #[serde(default)]
    pub todos: Vec<Record>,
    /// Routines.
    #[serde(default)]
    pub routines: Vec<Record>,
    /// Notes.
    #[serde(default)]
    pub notes: Vec<Record>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one kind.
    pub fn records(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Todos => &self.todos,
            RecordKind::Routines => &self.routines,
            RecordKind::Notes => &self.notes,
        }
    }

    /// Mutable records of one kind.
    pub fn records_mut(&mut self, kind: RecordKind) -> &mut Vec<Record> {
        match kind {
            RecordKind::Todos => &mut self.todos,
            RecordKind::Routines => &mut self.routines,
            RecordKind::Notes => &mut self.notes,
        }
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.todos.len() + self.routines.len() + self.notes.len()
    }

    /// True if no kind holds any record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The room document: one per room code, overwritten on every push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    /// The synced collections.
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// Server-assigned write time in milliseconds.
    #[serde(default)]
    pub last_updated: Option<u64>,
    /// Device that performed the write.
    pub device_id: DeviceId,
}

impl RemoteDocument {
    /// Server write time, or zero if the store has not assigned one.
    pub fn updated_at(&self) -> u64 {
        self.last_updated.unwrap_or(0)
    }

    /// True if this document was written by `device`.
    pub fn written_by(&self, device: &DeviceId) -> bool {
        &self.device_id == device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_counts_all_kinds() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.is_empty());

        snapshot.records_mut(RecordKind::Todos).push(Record::new("t1"));
        snapshot.records_mut(RecordKind::Notes).push(Record::new("n1"));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records(RecordKind::Routines).len(), 0);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn remote_document_wire_shape() {
        let doc = RemoteDocument {
            snapshot: Snapshot {
                todos: vec![Record::new("t1").with_created_at(5)],
                ..Snapshot::default()
            },
            last_updated: Some(1_000),
            device_id: DeviceId::new("dev-a"),
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["todos"][0]["id"], "t1");
        assert_eq!(value["lastUpdated"], 1_000);
        assert_eq!(value["deviceId"], "dev-a");
        assert!(value["routines"].as_array().unwrap().is_empty());
    }

    #[test]
    fn remote_document_tolerates_missing_collections() {
        let json = r#"{"todos":[{"id":"t1"}],"deviceId":"dev-b"}"#;
        let doc: RemoteDocument = serde_json::from_str(json).unwrap();

        assert_eq!(doc.snapshot.todos.len(), 1);
        assert!(doc.snapshot.notes.is_empty());
        assert_eq!(doc.updated_at(), 0);
        assert!(doc.written_by(&DeviceId::new("dev-b")));
    }
}
