//! In-memory remote store for testing.
//!
//! Clones share the same documents, so several devices in one test can sync
//! through a single `MemoryRemote`. Supports failure injection, a write log,
//! document deletion and a settable clock.

use super::{
    decode_document, merge_fields, DocumentWrite, RemoteStore, RemoteWatch, TransportError,
    WatchEvent,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use stellar_sync_types::{DeviceId, RemoteDocument};
use tokio::sync::mpsc::UnboundedSender;

/// A write that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWrite {
    /// Document key.
    pub key: String,
    /// Writing device.
    pub device_id: DeviceId,
    /// Timestamp the store assigned.
    pub updated_at: u64,
    /// Whether this was a merge write.
    pub merge: bool,
}

/// In-memory remote store.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    inner: Arc<Mutex<MemoryRemoteInner>>,
}

#[derive(Debug, Default)]
struct MemoryRemoteInner {
    documents: HashMap<String, Map<String, Value>>,
    watchers: HashMap<String, Vec<UnboundedSender<WatchEvent>>>,
    writes: Vec<RemoteWrite>,
    clock: Option<u64>,
    fail_next_get: Option<String>,
    fail_next_set: Option<String>,
    fail_next_watch: Option<String>,
}

impl MemoryRemoteInner {
    fn now(&self) -> u64 {
        self.clock.unwrap_or_else(crate::unix_millis)
    }

    fn notify(&mut self, key: &str, event: WatchEvent) {
        if let Some(watchers) = self.watchers.get_mut(key) {
            watchers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn write(
        &mut self,
        key: &str,
        write: DocumentWrite,
        merge: bool,
    ) -> Result<RemoteDocument, TransportError> {
        if let Some(error) = self.fail_next_set.take() {
            return Err(TransportError::Unavailable(error));
        }

        let updated_at = self.now();
        let fields = write.to_fields(updated_at)?;
        let stored = match (merge, self.documents.get(key)) {
            (true, Some(existing)) => {
                let mut merged = existing.clone();
                merge_fields(&mut merged, fields);
                merged
            }
            _ => fields,
        };
        let document = decode_document(&stored)?;
        self.documents.insert(key.to_string(), stored);

        self.writes.push(RemoteWrite {
            key: key.to_string(),
            device_id: write.device_id,
            updated_at,
            merge,
        });
        self.notify(key, WatchEvent::Snapshot(Some(document.clone())));
        Ok(document)
    }
}

impl MemoryRemote {
    /// Create an empty store using the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed clock. Every write is stamped with `millis` until changed.
    pub fn set_time(&self, millis: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.clock = Some(millis);
    }

    /// Advance the fixed clock (starting from zero if unset).
    pub fn advance(&self, millis: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.clock = Some(inner.clock.unwrap_or(0) + millis);
    }

    /// Peek at a document without failure injection.
    pub fn document(&self, key: &str) -> Option<RemoteDocument> {
        let inner = self.inner.lock().unwrap();
        inner
            .documents
            .get(key)
            .and_then(|fields| decode_document(fields).ok())
    }

    /// Raw stored fields of a document.
    pub fn raw_document(&self, key: &str) -> Option<Map<String, Value>> {
        let inner = self.inner.lock().unwrap();
        inner.documents.get(key).cloned()
    }

    /// Store raw fields as a document, bypassing timestamps and the write log.
    pub fn insert_raw(&self, key: &str, fields: Map<String, Value>) {
        let mut inner = self.inner.lock().unwrap();
        let event = WatchEvent::Snapshot(decode_document(&fields).ok());
        inner.documents.insert(key.to_string(), fields);
        inner.notify(key, event);
    }

    /// Delete a document and notify watchers that it is missing.
    pub fn delete(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.documents.remove(key);
        inner.notify(key, WatchEvent::Snapshot(None));
    }

    /// All writes so far, oldest first.
    pub fn writes(&self) -> Vec<RemoteWrite> {
        let inner = self.inner.lock().unwrap();
        inner.writes.clone()
    }

    /// Number of writes to `key`.
    pub fn write_count(&self, key: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.writes.iter().filter(|w| w.key == key).count()
    }

    /// Number of live watchers on `key`.
    pub fn watcher_count(&self, key: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .watchers
            .get(key)
            .map(|w| w.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Cause the next get() to fail with the given error.
    pub fn fail_next_get(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_get = Some(error.to_string());
    }

    /// Cause the next set() or set_merge() to fail with the given error.
    pub fn fail_next_set(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_set = Some(error.to_string());
    }

    /// Cause the next watch() to fail with the given error.
    pub fn fail_next_watch(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_watch = Some(error.to_string());
    }

    /// Fail every live watcher on `key` and drop them.
    pub fn break_watchers(&self, key: &str, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(watchers) = inner.watchers.remove(key) {
            for tx in watchers {
                let _ = tx.send(WatchEvent::Error(TransportError::Unavailable(
                    error.to_string(),
                )));
            }
        }
    }
}

impl Clone for MemoryRemote {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn get(&self, key: &str) -> Result<Option<RemoteDocument>, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_get.take() {
            return Err(TransportError::Unavailable(error));
        }

        inner.documents.get(key).map(decode_document).transpose()
    }

    async fn set(
        &self,
        key: &str,
        write: DocumentWrite,
    ) -> Result<RemoteDocument, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.write(key, write, false)
    }

    async fn set_merge(
        &self,
        key: &str,
        write: DocumentWrite,
    ) -> Result<RemoteDocument, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.write(key, write, true)
    }

    async fn watch(&self, key: &str) -> Result<RemoteWatch, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_watch.take() {
            return Err(TransportError::Unavailable(error));
        }

        let current = inner.documents.get(key).map(decode_document).transpose();
        let (tx, watch) = RemoteWatch::channel();
        match current {
            Ok(document) => {
                let _ = tx.send(WatchEvent::Snapshot(document));
                inner.watchers.entry(key.to_string()).or_default().push(tx);
            }
            Err(error) => {
                let _ = tx.send(WatchEvent::Error(error));
            }
        }
        Ok(watch)
    }
}
