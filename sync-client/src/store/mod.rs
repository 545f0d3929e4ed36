//! Local durable key-value store.
//!
//! The engine persists its session and the synced collections as strings
//! under fixed keys. Writes are durable by the time `set` returns.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;
use thiserror::Error;

/// Key of the persisted [`SessionState`](stellar_sync_types::SessionState).
pub const SESSION_KEY: &str = "stellar.sync.session";
/// Key of the task collection.
pub const TODOS_KEY: &str = "stellar.todos";
/// Key of the routine collection.
pub const ROUTINES_KEY: &str = "stellar.routines";
/// Key of the note collection.
pub const NOTES_KEY: &str = "stellar.notes";
/// Key of the local last-updated timestamp (milliseconds).
pub const LAST_UPDATED_KEY: &str = "stellar.lastUpdated";

/// Local store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("corrupt value under {key}: {message}")]
    Corrupt {
        /// Key being accessed.
        key: String,
        /// Decoder message.
        message: String,
    },

    /// The key cannot be stored by this backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Synchronous string key-value store.
pub trait LocalStore: Send + Sync {
    /// Read the value under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Durably write `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: LocalStore + ?Sized> LocalStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: LocalStore + ?Sized> LocalStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
