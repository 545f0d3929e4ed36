//! Synced records and the collections they belong to.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownRecordKind;

/// The three record collections.
///
/// Records of one kind never merge with records of another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Tasks / goals.
    Todos,
    /// Recurring routines.
    Routines,
    /// Free-form notes.
    Notes,
}

impl RecordKind {
    /// Every kind, in document order.
    pub const ALL: [RecordKind; 3] = [RecordKind::Todos, RecordKind::Routines, RecordKind::Notes];

    /// Field name used in snapshots and room documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Todos => "todos",
            RecordKind::Routines => "routines",
            RecordKind::Notes => "notes",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = UnknownRecordKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" | "todos" | "task" | "tasks" => Ok(RecordKind::Todos),
            "routine" | "routines" => Ok(RecordKind::Routines),
            "note" | "notes" => Ok(RecordKind::Notes),
            other => Err(UnknownRecordKind(other.to_string())),
        }
    }
}

/// One synced item (a task, routine or note).
///
/// Only `id` and the two timestamps matter to the sync engine. Every other
/// field is carried in `fields` and round-trips untouched, so whole records
/// are merged without the engine knowing their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable unique identifier.
    pub id: String,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    /// Completion or failure time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<u64>,
    /// Everything else the app stores on the record.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            resolved_at: None,
            fields: Map::new(),
        }
    }

    /// Set the creation time.
    pub fn with_created_at(mut self, millis: u64) -> Self {
        self.created_at = Some(millis);
        self
    }

    /// Set the resolved (completed or failed) time.
    pub fn with_resolved_at(mut self, millis: u64) -> Self {
        self.resolved_at = Some(millis);
        self
    }

    /// Set an app-defined field.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Look up an app-defined field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Timestamp used to pick between two versions of the same record.
    ///
    /// Resolved time if present, else creation time, else zero.
    pub fn freshness(&self) -> u64 {
        self.resolved_at.or(self.created_at).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_prefers_resolved_time() {
        let record = Record::new("a").with_created_at(100).with_resolved_at(500);
        assert_eq!(record.freshness(), 500);
    }

    #[test]
    fn freshness_falls_back_to_created_then_zero() {
        assert_eq!(Record::new("a").with_created_at(100).freshness(), 100);
        assert_eq!(Record::new("a").freshness(), 0);
    }

    #[test]
    fn unknown_fields_round_trip() {
        let json = r#"{"id":"t1","createdAt":10,"title":"Run 5k","points":3}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "t1");
        assert_eq!(record.created_at, Some(10));
        assert_eq!(record.resolved_at, None);
        assert_eq!(record.field("title"), Some(&Value::from("Run 5k")));

        let back: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(back["points"], 3);
        assert_eq!(back["createdAt"], 10);
        assert!(back.get("resolvedAt").is_none());
    }

    #[test]
    fn record_kind_parses_aliases() {
        assert_eq!("task".parse::<RecordKind>().unwrap(), RecordKind::Todos);
        assert_eq!("Routines".parse::<RecordKind>().unwrap(), RecordKind::Routines);
        assert_eq!("note".parse::<RecordKind>().unwrap(), RecordKind::Notes);
        assert!("habit".parse::<RecordKind>().is_err());
    }
}
