//! Reconnect direction rule.
//!
//! When a device with a known room reconnects, it compares the room's
//! server write time against its own effective local timestamp and decides
//! whether to pull, push, or merge both sides.

use std::time::Duration;
use stellar_sync_types::{RemoteDocument, Snapshot};

/// Default width of the "edited around the same time" window.
pub const DEFAULT_MERGE_WINDOW: Duration = Duration::from_millis(5000);

/// Outcome of the direction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Merge both sides per record kind, write the result to the room and
    /// apply it locally.
    Merge,
    /// Apply the remote snapshot locally. No write.
    Pull,
    /// Write the local snapshot to the room. No local change.
    Push,
}

/// The facts the direction rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSides {
    /// Effective local update time in milliseconds.
    pub local_updated_at: u64,
    /// Server write time of the room document in milliseconds.
    pub remote_updated_at: u64,
    /// Whether the local snapshot holds any record.
    pub local_has_records: bool,
    /// Whether the room document holds any record.
    pub remote_has_records: bool,
}

impl SyncSides {
    /// Describe a local snapshot and a room document.
    pub fn new(local: &Snapshot, local_updated_at: u64, remote: &RemoteDocument) -> Self {
        Self {
            local_updated_at,
            remote_updated_at: remote.updated_at(),
            local_has_records: !local.is_empty(),
            remote_has_records: !remote.snapshot.is_empty(),
        }
    }
}

/// Decide the sync direction.
///
/// Let `delta = remote - local`:
/// 1. `|delta| < window`: [`Direction::Merge`].
/// 2. Remote strictly newer, or only the remote holds records: [`Direction::Pull`].
/// 3. Local strictly newer, or only the local side holds records: [`Direction::Push`].
/// 4. Anything else: [`Direction::Pull`] (read-side bias).
pub fn decide(sides: &SyncSides, window: Duration) -> Direction {
    let delta = i128::from(sides.remote_updated_at) - i128::from(sides.local_updated_at);
    let window_ms = window.as_millis() as i128;

    if delta.abs() < window_ms {
        return Direction::Merge;
    }

    if delta > 0 || (sides.remote_has_records && !sides.local_has_records) {
        return Direction::Pull;
    }

    if delta < 0 || (sides.local_has_records && !sides.remote_has_records) {
        return Direction::Push;
    }

    Direction::Pull
}
