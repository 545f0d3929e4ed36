//! # sync-client
//!
//! Offline-first sync engine for stellar-sync.
//!
//! This is the library that applications use to keep their tasks, routines
//! and notes consistent across devices through a shared room document.
//!
//! ## Layers
//!
//! - [`store`] - Local durable key-value store ([`MemoryStore`], [`FileStore`])
//! - [`remote`] - Remote document store abstraction ([`MemoryRemote`] for tests)
//! - [`session`] - Persisted device identity and room membership
//! - [`room`] - Create, join, read and write a room
//! - [`subscriber`] - Live subscription to a room document
//! - [`orchestrator`] - The coordinator: direction rule, debounced pushes,
//!   self-echo suppression and the baseline latch
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stellar_sync_client::{MemoryRemote, MemoryStore, StoredCollections, SyncConfig, SyncOrchestrator};
//!
//! let store = Arc::new(MemoryStore::new());
//! let host = StoredCollections::new(store.clone());
//! let sync = SyncOrchestrator::new(MemoryRemote::new(), store, host, SyncConfig::default())?;
//!
//! let code = sync.create_room("star-7x9k").await?;
//! sync.notify_local_change();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod remote;
pub mod room;
pub mod session;
pub mod store;
pub mod subscriber;

pub use config::SyncConfig;
pub use error::SyncError;
pub use host::{StoredCollections, SyncHost};
pub use orchestrator::{ForceSyncOutcome, PushOutcome, SyncOrchestrator};
pub use remote::{
    DocumentWrite, MemoryRemote, RemoteStore, RemoteWatch, RemoteWrite, TransportError,
    WatchEvent,
};
pub use room::{room_key, RoomClient, WriteMode};
pub use session::SessionStore;
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};
pub use subscriber::{ChangeSubscriber, Subscription, SubscriptionHandler};

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
