//! Per-installation sync session.

use serde::{Deserialize, Serialize};

use crate::ids::{DeviceId, RoomCode};

/// Persisted sync session for one installation.
///
/// `device_id` is generated once and survives [`SessionState::disconnect`];
/// it is never rotated while a room membership is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Room this device syncs with, if any.
    #[serde(default)]
    pub room_code: Option<RoomCode>,
    /// This installation's id.
    pub device_id: DeviceId,
    /// Whether sync is switched on.
    #[serde(default)]
    pub enabled: bool,
    /// Server time of the last successful push or pull.
    #[serde(default, rename = "lastSyncedAtMillis")]
    pub last_synced_at: Option<u64>,
}

impl SessionState {
    /// A disabled session for the given device.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            room_code: None,
            device_id,
            enabled: false,
            last_synced_at: None,
        }
    }

    /// A disabled session with a freshly generated device id.
    pub fn fresh() -> Self {
        Self::new(DeviceId::random())
    }

    /// True if sync is on and a room is configured.
    pub fn is_active(&self) -> bool {
        self.enabled && self.room_code.is_some()
    }

    /// Record membership of `code` after a successful create or join.
    pub fn enter_room(&mut self, code: RoomCode, synced_at: Option<u64>) {
        self.room_code = Some(code);
        self.enabled = true;
        self.record_sync(synced_at);
    }

    /// Record a successful push or pull.
    ///
    /// A missing server time leaves the previous value in place.
    pub fn record_sync(&mut self, synced_at: Option<u64>) {
        if synced_at.is_some() {
            self.last_synced_at = synced_at;
        }
    }

    /// Leave the room. Keeps the device id.
    pub fn disconnect(&mut self) {
        self.room_code = None;
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_disabled() {
        let session = SessionState::fresh();
        assert!(!session.enabled);
        assert!(session.room_code.is_none());
        assert!(!session.is_active());
    }

    #[test]
    fn disconnect_keeps_device_id() {
        let mut session = SessionState::new(DeviceId::new("dev-a"));
        session.enter_room(RoomCode::parse("STAR-7X9K").unwrap(), Some(42));
        assert!(session.is_active());
        assert_eq!(session.last_synced_at, Some(42));

        session.disconnect();

        assert!(!session.is_active());
        assert!(session.room_code.is_none());
        assert_eq!(session.device_id, DeviceId::new("dev-a"));
    }

    #[test]
    fn record_sync_ignores_missing_timestamp() {
        let mut session = SessionState::fresh();
        session.record_sync(Some(10));
        session.record_sync(None);
        assert_eq!(session.last_synced_at, Some(10));
    }

    #[test]
    fn wire_shape_uses_millis_field_name() {
        let mut session = SessionState::new(DeviceId::new("dev-a"));
        session.enter_room(RoomCode::parse("nova-ab12").unwrap(), Some(7));

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["roomCode"], "NOVA-AB12");
        assert_eq!(value["deviceId"], "dev-a");
        assert_eq!(value["enabled"], true);
        assert_eq!(value["lastSyncedAtMillis"], 7);
    }
}
