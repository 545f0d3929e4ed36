//! Orchestrator configuration.

use std::time::Duration;
use stellar_sync_core::DEFAULT_MERGE_WINDOW;

/// Default quiescence window before a local change is pushed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for [`SyncOrchestrator`](crate::SyncOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Wait this long after the last local change before pushing.
    pub debounce: Duration,
    /// Timestamps closer than this are treated as concurrent edits and merged.
    pub merge_window: Duration,
    /// Refuse to create a room whose code is already in use.
    pub reject_existing_rooms: bool,
    /// Buffered events per subscriber before slow receivers lag.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            merge_window: DEFAULT_MERGE_WINDOW,
            reject_existing_rooms: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SyncConfig {
    /// Set the push debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the merge window of the direction rule.
    pub fn with_merge_window(mut self, window: Duration) -> Self {
        self.merge_window = window;
        self
    }

    /// Refuse (or allow) creating a room over an existing one.
    pub fn with_reject_existing_rooms(mut self, reject: bool) -> Self {
        self.reject_existing_rooms = reject;
        self
    }

    /// Set the event channel capacity. Zero is raised to one.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
