//! Engine-level errors.

use stellar_sync_types::{RoomCode, RoomCodeError};
use thiserror::Error;

use crate::remote::TransportError;
use crate::store::StoreError;

/// Errors returned by the room client and the orchestrator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote store failure (network, permission).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Local store failure.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// The room code is malformed.
    #[error("invalid room code: {0}")]
    InvalidRoomCode(#[from] RoomCodeError),

    /// No room is configured for this device.
    #[error("no room configured")]
    NotConfigured,

    /// Sync is switched off or not connected.
    #[error("sync is not enabled")]
    Disabled,

    /// A room with this code already exists.
    #[error("room {0} already exists")]
    RoomExists(RoomCode),

    /// The operation was overtaken by a disconnect or a newer connect.
    #[error("superseded by a newer sync request")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_convert() {
        let err: SyncError = TransportError::Unavailable("offline".into()).into();
        assert!(matches!(err, SyncError::Transport(_)));
        assert_eq!(err.to_string(), "transport error: remote unavailable: offline");
    }

    #[test]
    fn room_code_errors_convert() {
        let err: SyncError = RoomCode::parse("").unwrap_err().into();
        assert!(matches!(err, SyncError::InvalidRoomCode(_)));
    }
}
