//! Remote document store abstraction.
//!
//! The remote side is a keyed collection of JSON documents supporting:
//! - `get()` reads a document
//! - `set()` replaces a document
//! - `set_merge()` merges top-level fields into a document (creating it if absent)
//! - `watch()` streams full-document snapshots, including a "missing" signal
//!
//! The store assigns `lastUpdated` on every write.
//!
//! # Example
//!
//! ```ignore
//! let remote = MemoryRemote::new();
//! let doc = remote.set("rooms/STAR-7X9K", DocumentWrite::new(snapshot, device_id)).await?;
//! let mut watch = remote.watch("rooms/STAR-7X9K").await?;
//! while let Some(event) = watch.next().await { /* ... */ }
//! ```

mod memory;

pub use memory::{MemoryRemote, RemoteWrite};

use async_trait::async_trait;
use serde_json::{Map, Value};
use stellar_sync_types::{DeviceId, RemoteDocument, Snapshot};
use thiserror::Error;
use tokio::sync::mpsc;

/// Remote store errors. These are transport failures; a missing document is
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The store could not be reached.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The store refused the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A document could not be encoded or decoded.
    #[error("malformed document: {0}")]
    Serialization(String),

    /// The watch stream ended.
    #[error("watch closed")]
    Closed,
}

/// The payload of a write. The store adds the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    /// Collections to write.
    pub snapshot: Snapshot,
    /// Writing device.
    pub device_id: DeviceId,
}

impl DocumentWrite {
    /// Create a write of `snapshot` by `device_id`.
    pub fn new(snapshot: Snapshot, device_id: DeviceId) -> Self {
        Self {
            snapshot,
            device_id,
        }
    }

    /// Top-level document fields for this write, stamped with `updated_at`.
    pub fn to_fields(&self, updated_at: u64) -> Result<Map<String, Value>, TransportError> {
        let document = RemoteDocument {
            snapshot: self.snapshot.clone(),
            last_updated: Some(updated_at),
            device_id: self.device_id.clone(),
        };
        match serde_json::to_value(document) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(_) => Err(TransportError::Serialization(
                "document is not an object".into(),
            )),
            Err(e) => Err(TransportError::Serialization(e.to_string())),
        }
    }
}

/// Shallow merge: every top-level field of `fields` replaces the one in `target`.
pub fn merge_fields(target: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (key, value) in fields {
        target.insert(key, value);
    }
}

/// Decode stored document fields.
pub fn decode_document(fields: &Map<String, Value>) -> Result<RemoteDocument, TransportError> {
    serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| TransportError::Serialization(e.to_string()))
}

/// One notification from a watch.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Current document, or `None` if it does not exist.
    Snapshot(Option<RemoteDocument>),
    /// The watch failed. No further events follow.
    Error(TransportError),
}

/// Receiving half of a watch.
#[derive(Debug)]
pub struct RemoteWatch {
    rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl RemoteWatch {
    /// Create a watch and the sender that feeds it.
    ///
    /// Store implementations stop feeding once `send` fails, which happens
    /// when the watch is dropped.
    pub fn channel() -> (mpsc::UnboundedSender<WatchEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Wait for the next event. `None` means the store closed the stream.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        self.rx.recv().await
    }
}

/// Remote document store.
///
/// Implementations handle the underlying storage (a hosted document
/// database, a shared directory, memory).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read a document.
    async fn get(&self, key: &str) -> Result<Option<RemoteDocument>, TransportError>;

    /// Replace a document.
    async fn set(&self, key: &str, write: DocumentWrite)
        -> Result<RemoteDocument, TransportError>;

    /// Merge the write's fields into a document, creating it if absent.
    async fn set_merge(
        &self,
        key: &str,
        write: DocumentWrite,
    ) -> Result<RemoteDocument, TransportError>;

    /// Watch a document. The first event reflects the current state.
    async fn watch(&self, key: &str) -> Result<RemoteWatch, TransportError>;
}
