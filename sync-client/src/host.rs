//! The application side of sync.
//!
//! The orchestrator never owns the user's records. It asks a [`SyncHost`]
//! for the current local snapshot and hands it remote snapshots to apply.

use serde::de::DeserializeOwned;
use serde::Serialize;
use stellar_sync_types::{Record, RecordKind, Snapshot};

use crate::store::{
    LocalStore, StoreError, LAST_UPDATED_KEY, NOTES_KEY, ROUTINES_KEY, TODOS_KEY,
};

/// Local state supplied by the application.
pub trait SyncHost: Send + Sync {
    /// Current local collections.
    fn snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Replace local collections with data that came from the room.
    ///
    /// This must not be reported back through
    /// [`SyncOrchestrator::notify_local_change`](crate::SyncOrchestrator::notify_local_change)
    /// as a local edit; the orchestrator ignores such calls while applying.
    fn apply_remote(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// When the user last edited local data, in milliseconds.
    fn local_updated_at(&self) -> Result<Option<u64>, StoreError>;
}

/// Collections persisted in a [`LocalStore`] under the `stellar.*` keys.
#[derive(Debug, Clone)]
pub struct StoredCollections<S> {
    store: S,
}

fn key_for(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Todos => TODOS_KEY,
        RecordKind::Routines => ROUTINES_KEY,
        RecordKind::Notes => NOTES_KEY,
    }
}

impl<S: LocalStore> StoredCollections<S> {
    /// Wrap a local store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read all collections. Missing keys are empty collections.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let mut snapshot = Snapshot::new();
        for kind in RecordKind::ALL {
            *snapshot.records_mut(kind) = self
                .read_json::<Vec<Record>>(key_for(kind))?
                .unwrap_or_default();
        }
        Ok(snapshot)
    }

    /// Apply a local edit and stamp the local last-updated time.
    pub fn update<T>(&self, f: impl FnOnce(&mut Snapshot) -> T) -> Result<T, StoreError> {
        let mut snapshot = self.load()?;
        let result = f(&mut snapshot);
        self.save(&snapshot)?;
        self.store
            .set(LAST_UPDATED_KEY, &crate::unix_millis().to_string())?;
        Ok(result)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        for kind in RecordKind::ALL {
            self.write_json(key_for(kind), snapshot.records(kind))?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &raw)
    }
}

impl<S: LocalStore> SyncHost for StoredCollections<S> {
    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        self.load()
    }

    fn apply_remote(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.save(snapshot)
    }

    fn local_updated_at(&self) -> Result<Option<u64>, StoreError> {
        self.read_json(LAST_UPDATED_KEY)
    }
}
