//! # sync-types
//!
//! Data model shared by all stellar-sync crates:
//! - [`DeviceId`], [`RoomCode`] - Identity types
//! - [`Record`], [`RecordKind`] - A single synced item and its collection
//! - [`Snapshot`], [`RemoteDocument`] - Full local state and the room document
//! - [`SessionState`] - Per-installation sync session
//!
//! Everything here is plain data. Field names serialize in camelCase so the
//! persisted and remote shapes stay compatible with other clients.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod document;
mod error;
mod ids;
mod record;
mod session;

pub use document::{RemoteDocument, Snapshot};
pub use error::{RoomCodeError, UnknownRecordKind};
pub use ids::{DeviceId, RoomCode};
pub use record::{Record, RecordKind};
pub use session::SessionState;
