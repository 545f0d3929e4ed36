//! # sync-core
//!
//! Pure logic for stellar-sync (no I/O, instant tests).
//!
//! This crate holds the decisions of the sync engine without any network or
//! disk access:
//! - [`merge`] - per-id record merge preferring the fresher version
//! - [`direction`] - whether a reconnect should pull, push or merge
//! - [`state`] - the user-visible status machine
//! - [`gate`] - the conditions under which a local push may be sent
//! - [`room_code`] - human-typable room code generation
//!
//! The actual I/O (local store, remote document) is performed by
//! `sync-client`, which interprets the decisions made here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod direction;
pub mod gate;
pub mod merge;
pub mod room_code;
pub mod state;

pub use direction::{decide, Direction, SyncSides, DEFAULT_MERGE_WINDOW};
pub use gate::{MissingRoom, PushBlocked, PushGate};
pub use merge::{merge_records, merge_snapshots};
pub use room_code::{generate_room_code, ROOM_CODE_ALPHABET, ROOM_CODE_WORDS};
pub use state::{Action, Event, SyncEvent, SyncStatus};
