//! Sync status state machine for stellar-sync.
//!
//! This module provides a pure, side-effect-free state machine for the
//! user-visible sync status. The state machine takes events as input and
//! produces a new state plus a list of actions to execute.
//!
//! The actual I/O (reading the room, subscribing, writing the session) is
//! performed by sync-client, not by this module.

use stellar_sync_types::RoomCode;

/// User-visible sync status - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Sync is off or no room is configured.
    Disconnected,
    /// Reading the room and deciding the sync direction.
    Connecting {
        /// Room being connected to.
        room_code: RoomCode,
    },
    /// Subscribed to the room.
    Connected {
        /// Room currently synced.
        room_code: RoomCode,
    },
    /// A transport failure during connect or while subscribed.
    ///
    /// The session keeps its room code so a later retry can reuse it.
    Error {
        /// Room the failure happened on.
        room_code: RoomCode,
        /// Error message describing the failure.
        error: String,
    },
}

impl SyncStatus {
    /// Create a new state machine in the Disconnected state.
    pub fn new() -> Self {
        Self::Disconnected
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (sync-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            // A new attempt supersedes any earlier one
            (_, Event::ConnectRequested { room_code }) => {
                transition(Self::Connecting { room_code }, vec![])
            }

            // From Connecting
            (Self::Connecting { room_code }, Event::ConnectSucceeded) => {
                transition(Self::Connected { room_code }, vec![])
            }
            (Self::Connecting { room_code }, Event::ConnectFailed { error }) => transition(
                Self::Error { room_code, error },
                vec![Action::CancelPendingPush, Action::Unsubscribe],
            ),
            (Self::Connecting { .. }, Event::RoomNotFound) => transition(
                Self::Disconnected,
                vec![Action::CancelPendingPush, Action::Unsubscribe],
            ),

            // Subscription died, either during the compare phase or later
            (
                Self::Connecting { room_code } | Self::Connected { room_code },
                Event::SubscriptionFailed { error },
            ) => transition(
                Self::Error { room_code, error },
                vec![Action::CancelPendingPush, Action::Unsubscribe],
            ),

            // From anywhere
            (Self::Disconnected, Event::DisconnectRequested) => (
                Self::Disconnected,
                vec![
                    Action::CancelPendingPush,
                    Action::Unsubscribe,
                    Action::ClearSession,
                ],
            ),
            (_, Event::DisconnectRequested) => transition(
                Self::Disconnected,
                vec![
                    Action::CancelPendingPush,
                    Action::Unsubscribe,
                    Action::ClearSession,
                ],
            ),
            (Self::Disconnected, Event::ShutdownRequested) => (
                Self::Disconnected,
                vec![Action::CancelPendingPush, Action::Unsubscribe],
            ),
            (_, Event::ShutdownRequested) => transition(
                Self::Disconnected,
                vec![Action::CancelPendingPush, Action::Unsubscribe],
            ),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if subscribed to a room.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Check if a connect attempt is in progress.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. })
    }

    /// Room the status refers to, if any.
    pub fn room_code(&self) -> Option<&RoomCode> {
        match self {
            Self::Disconnected => None,
            Self::Connecting { room_code }
            | Self::Connected { room_code }
            | Self::Error { room_code, .. } => Some(room_code),
        }
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the status-changed notification to a transition's actions.
fn transition(state: SyncStatus, mut actions: Vec<Action>) -> (SyncStatus, Vec<Action>) {
    actions.push(Action::EmitEvent(SyncEvent::StatusChanged(state.clone())));
    (state, actions)
}

/// Events that drive the sync status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Enable, create or join was requested for a room.
    ConnectRequested {
        /// Room to connect to.
        room_code: RoomCode,
    },
    /// The room was read (or created) and the subscription is attached.
    ConnectSucceeded,
    /// A transport failure happened while connecting.
    ConnectFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// A join found no room document for the code.
    RoomNotFound,
    /// The live subscription reported a transport failure.
    SubscriptionFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// The user turned sync off.
    DisconnectRequested,
    /// The owning view is being torn down; the session is kept.
    ShutdownRequested,
}

/// Actions to be executed by sync-client.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Cancel the debounce timer, if one is pending.
    CancelPendingPush,
    /// Drop the live room subscription.
    Unsubscribe,
    /// Clear room code and enabled flag in the session store.
    ClearSession,
    /// Emit an event to the application.
    EmitEvent(SyncEvent),
}

/// Events emitted to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The user-visible status changed.
    StatusChanged(SyncStatus),
    /// A remote snapshot was applied to local state.
    RemoteApplied {
        /// Number of records in the applied snapshot.
        records: usize,
        /// Server write time of the applied snapshot.
        updated_at: u64,
    },
    /// The local snapshot was written to the room.
    Pushed {
        /// Server write time assigned to the push.
        updated_at: u64,
    },
    /// A push failed; it is retried on the next local change.
    PushFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// The room document was missing and was recreated from local state.
    RoomRecreated {
        /// Room that was recreated.
        room_code: RoomCode,
    },
}
