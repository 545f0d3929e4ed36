//! Shared-directory remote store.
//!
//! Each document is a JSON file under the remote directory: the key
//! `rooms/STAR-7X9K` lives at `rooms/STAR-7X9K.json`. Two data directories
//! pointing at the same remote directory behave like two devices sharing a
//! hosted room. Watches poll the file and emit whenever its content changes.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use stellar_sync_client::remote::{decode_document, merge_fields};
use stellar_sync_client::{
    unix_millis, DocumentWrite, RemoteStore, RemoteWatch, TransportError, WatchEvent,
};
use stellar_sync_types::RemoteDocument;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Remote store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct DirRemote {
    dir: PathBuf,
    poll_interval: Duration,
}

impl DirRemote {
    /// Store documents under `dir`, polling watched files every `poll_interval`.
    pub fn new(dir: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll_interval,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, TransportError> {
        let mut path = self.dir.clone();
        for segment in key.split('/') {
            let valid = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
            if !valid {
                return Err(TransportError::PermissionDenied(format!(
                    "invalid document key {:?}",
                    key
                )));
            }
            path.push(segment);
        }
        path.set_extension("json");
        Ok(path)
    }

    async fn write(
        &self,
        key: &str,
        write: DocumentWrite,
        merge: bool,
    ) -> Result<RemoteDocument, TransportError> {
        let path = self.path_for(key)?;
        let existing = match read_raw(&path).await? {
            Some(raw) => Some(parse_fields(&raw)?),
            None => None,
        };

        // Keep timestamps strictly increasing per document even if two
        // writes land within the same millisecond.
        let previous = existing
            .as_ref()
            .and_then(|fields| fields.get("lastUpdated"))
            .and_then(Value::as_u64);
        let updated_at = unix_millis().max(previous.map_or(0, |p| p + 1));

        let fields = write.to_fields(updated_at)?;
        let stored = match (merge, existing) {
            (true, Some(mut existing)) => {
                merge_fields(&mut existing, fields);
                existing
            }
            _ => fields,
        };
        let document = decode_document(&stored)?;

        let raw = serde_json::to_string_pretty(&Value::Object(stored))
            .map_err(|e| TransportError::Serialization(e.to_string()))?;
        write_atomic(&path, &raw).await?;
        debug!(key, updated_at, merge, "wrote document");
        Ok(document)
    }
}

#[async_trait]
impl RemoteStore for DirRemote {
    async fn get(&self, key: &str) -> Result<Option<RemoteDocument>, TransportError> {
        let path = self.path_for(key)?;
        match read_raw(&path).await? {
            Some(raw) => decode_document(&parse_fields(&raw)?).map(Some),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, write: DocumentWrite) -> Result<RemoteDocument, TransportError> {
        self.write(key, write, false).await
    }

    async fn set_merge(
        &self,
        key: &str,
        write: DocumentWrite,
    ) -> Result<RemoteDocument, TransportError> {
        self.write(key, write, true).await
    }

    async fn watch(&self, key: &str) -> Result<RemoteWatch, TransportError> {
        let path = self.path_for(key)?;
        let initial = read_raw(&path).await?;
        let interval = self.poll_interval;
        let (tx, watch) = RemoteWatch::channel();

        tokio::spawn(async move {
            let mut last = initial;
            let mut next = Some(snapshot_event(&last));
            while let Some(event) = next {
                // An error ends the watch.
                let failed = matches!(event, WatchEvent::Error(_));
                if tx.send(event).is_err() || failed {
                    break;
                }
                next = next_change(&path, &mut last, interval, &tx).await;
            }
            debug!(path = %path.display(), "watch stopped");
        });

        Ok(watch)
    }
}

/// Poll `path` until its content differs from `last`. Returns `None` once
/// the watch has been dropped.
async fn next_change(
    path: &Path,
    last: &mut Option<String>,
    interval: Duration,
    tx: &UnboundedSender<WatchEvent>,
) -> Option<WatchEvent> {
    loop {
        tokio::time::sleep(interval).await;
        if tx.is_closed() {
            return None;
        }
        match read_raw(path).await {
            Ok(current) if current != *last => {
                let event = snapshot_event(&current);
                *last = current;
                return Some(event);
            }
            Ok(_) => {}
            Err(error) => return Some(WatchEvent::Error(error)),
        }
    }
}

fn snapshot_event(raw: &Option<String>) -> WatchEvent {
    let Some(raw) = raw else {
        return WatchEvent::Snapshot(None);
    };
    match parse_fields(raw).and_then(|fields| decode_document(&fields)) {
        Ok(document) => WatchEvent::Snapshot(Some(document)),
        Err(error) => WatchEvent::Error(error),
    }
}

fn parse_fields(raw: &str) -> Result<Map<String, Value>, TransportError> {
    serde_json::from_str(raw).map_err(|e| TransportError::Serialization(e.to_string()))
}

fn io_error(path: &Path, error: std::io::Error) -> TransportError {
    let message = format!("{}: {}", path.display(), error);
    match error.kind() {
        ErrorKind::PermissionDenied => TransportError::PermissionDenied(message),
        _ => TransportError::Unavailable(message),
    }
}

async fn read_raw(path: &Path) -> Result<Option<String>, TransportError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Write to a sibling temp file and rename it into place, so pollers never
/// see a half-written document.
async fn write_atomic(path: &Path, raw: &str) -> Result<(), TransportError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }
    static NEXT_TMP: AtomicU64 = AtomicU64::new(0);
    let tmp = path.with_extension(format!(
        "json.{}-{}.tmp",
        std::process::id(),
        NEXT_TMP.fetch_add(1, Ordering::Relaxed)
    ));
    tokio::fs::write(&tmp, raw)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error(path, e))
}
