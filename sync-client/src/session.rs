//! Local Session Store.
//!
//! Persists device identity, the current room code, the enabled flag and the
//! last-synced timestamp across restarts.

use stellar_sync_types::{DeviceId, SessionState};
use tracing::warn;

use crate::store::{LocalStore, StoreError, SESSION_KEY};

/// Reads and writes the [`SessionState`] blob in a [`LocalStore`].
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: LocalStore> SessionStore<S> {
    /// Wrap a local store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the session.
    ///
    /// Missing or unreadable data yields a fresh disabled session with a new
    /// device id, which is saved immediately so the id stays stable.
    pub fn load(&self) -> Result<SessionState, StoreError> {
        if let Some(raw) = self.store.get(SESSION_KEY)? {
            match serde_json::from_str(&raw) {
                Ok(session) => return Ok(session),
                Err(e) => warn!(error = %e, "discarding corrupt sync session"),
            }
        }

        let session = SessionState::fresh();
        self.save(&session)?;
        Ok(session)
    }

    /// Durably write the session.
    pub fn save(&self, session: &SessionState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(session).map_err(|e| StoreError::Corrupt {
            key: SESSION_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(SESSION_KEY, &raw)
    }

    /// Load, modify and save the session in one step.
    pub fn update(
        &self,
        f: impl FnOnce(&mut SessionState),
    ) -> Result<SessionState, StoreError> {
        let mut session = self.load()?;
        f(&mut session);
        self.save(&session)?;
        Ok(session)
    }

    /// This installation's device id, created on first access.
    pub fn get_or_create_device_id(&self) -> Result<DeviceId, StoreError> {
        Ok(self.load()?.device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use stellar_sync_types::RoomCode;

    #[test]
    fn first_load_creates_and_persists_session() {
        let sessions = SessionStore::new(MemoryStore::new());

        let first = sessions.load().unwrap();
        let second = sessions.load().unwrap();

        assert!(!first.enabled);
        assert!(first.room_code.is_none());
        assert_eq!(first.device_id, second.device_id);
    }

    #[test]
    fn device_id_is_stable() {
        let sessions = SessionStore::new(MemoryStore::new());
        let a = sessions.get_or_create_device_id().unwrap();
        let b = sessions.get_or_create_device_id().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn corrupt_session_yields_fresh_state() {
        let store = MemoryStore::new();
        store.set(SESSION_KEY, "{not json").unwrap();
        let sessions = SessionStore::new(&store);

        let session = sessions.load().unwrap();

        assert!(!session.enabled);
        // The replacement was written back.
        let raw = store.get(SESSION_KEY).unwrap().unwrap();
        assert!(raw.contains(session.device_id.as_str()));
    }

    #[test]
    fn update_round_trips_through_store() {
        let sessions = SessionStore::new(MemoryStore::new());
        let code = RoomCode::parse("star-7x9k").unwrap();

        sessions
            .update(|s| s.enter_room(code.clone(), Some(1234)))
            .unwrap();

        let loaded = sessions.load().unwrap();
        assert_eq!(loaded.room_code, Some(code));
        assert!(loaded.enabled);
        assert_eq!(loaded.last_synced_at, Some(1234));
    }

    #[test]
    fn persisted_shape_uses_wire_names() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new(&store);
        sessions.update(|s| s.record_sync(Some(7))).unwrap();

        let raw = store.get(SESSION_KEY).unwrap().unwrap();
        assert!(raw.contains("\"lastSyncedAtMillis\":7"));
        assert!(raw.contains("\"deviceId\""));
    }
}
