//! Room Client.
//!
//! Creates, joins, reads and writes the room document for a room code.
//!
//! The session-updating operations (`create_room`, `join_room`,
//! `push_changes`) are the standalone API for one-shot tools: they record
//! membership and sync time straight in the [`SessionStore`] and do not
//! enforce the read-before-write latch. The orchestrator keeps its own
//! session copy and latch, so it builds on the raw operations
//! (`one_shot_pull`, `write`), which leave the session alone and let it
//! decide whether a late result still applies.

use stellar_sync_types::{RemoteDocument, RoomCode, Snapshot};
use tracing::debug;

use crate::error::SyncError;
use crate::remote::{DocumentWrite, RemoteStore, TransportError};
use crate::session::SessionStore;
use crate::store::LocalStore;

/// Remote key of a room document.
pub fn room_key(code: &RoomCode) -> String {
    format!("rooms/{}", code)
}

/// How a write combines with an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole document.
    Overwrite,
    /// Replace the written fields, keep any others.
    Merge,
}

/// Room operations over a remote store.
#[derive(Debug, Clone)]
pub struct RoomClient<R, S> {
    remote: R,
    sessions: SessionStore<S>,
}

impl<R: RemoteStore, S: LocalStore> RoomClient<R, S> {
    /// Create a room client.
    pub fn new(remote: R, sessions: SessionStore<S>) -> Self {
        Self { remote, sessions }
    }

    /// The session store this client records membership in.
    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    /// The underlying remote store.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Write a brand-new room document for `code` and join it.
    ///
    /// An existing room with the same code is overwritten.
    pub async fn create_room(
        &self,
        code: &RoomCode,
        snapshot: &Snapshot,
    ) -> Result<RemoteDocument, SyncError> {
        let document = self.write(code, snapshot, WriteMode::Overwrite).await?;
        self.sessions
            .update(|s| s.enter_room(code.clone(), document.last_updated))?;
        Ok(document)
    }

    /// Read the room and, if it exists, join it.
    ///
    /// Returns `None` if no room document exists for `code`.
    pub async fn join_room(&self, code: &RoomCode) -> Result<Option<RemoteDocument>, SyncError> {
        let document = self.one_shot_pull(code).await?;
        if let Some(document) = &document {
            self.sessions
                .update(|s| s.enter_room(code.clone(), document.last_updated))?;
        }
        Ok(document)
    }

    /// Merge-write `snapshot` to the configured room.
    ///
    /// Returns `None` without writing if no room is configured.
    pub async fn push_changes(
        &self,
        snapshot: &Snapshot,
    ) -> Result<Option<RemoteDocument>, SyncError> {
        let Some(code) = self.sessions.load()?.room_code else {
            debug!("push skipped: no room configured");
            return Ok(None);
        };
        let document = self.write(&code, snapshot, WriteMode::Merge).await?;
        self.sessions.update(|s| s.record_sync(document.last_updated))?;
        Ok(Some(document))
    }

    /// Read the room document without touching the session.
    pub async fn one_shot_pull(
        &self,
        code: &RoomCode,
    ) -> Result<Option<RemoteDocument>, TransportError> {
        self.remote.get(&room_key(code)).await
    }

    /// Write `snapshot` as this device without touching the session.
    pub async fn write(
        &self,
        code: &RoomCode,
        snapshot: &Snapshot,
        mode: WriteMode,
    ) -> Result<RemoteDocument, SyncError> {
        let device_id = self.sessions.get_or_create_device_id()?;
        let write = DocumentWrite::new(snapshot.clone(), device_id);
        let key = room_key(code);
        let document = match mode {
            WriteMode::Overwrite => self.remote.set(&key, write).await?,
            WriteMode::Merge => self.remote.set_merge(&key, write).await?,
        };
        debug!(room = %code, records = snapshot.len(), ?mode, "wrote room");
        Ok(document)
    }
}
