//! Push gating and the baseline safety latch.
//!
//! A device may only write its local snapshot to the room once it has seen
//! the room's contents in this session (a join, a one-shot read, a live
//! subscription delivery, or its own create). The gate also holds pushes
//! back while sync is off, while the initial connect/compare phase runs, and
//! while a remote snapshot is being applied locally.

/// Why a push was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushBlocked {
    /// Sync is switched off.
    Disabled,
    /// The initial read/compare phase has not finished.
    Connecting,
    /// The change came from applying a remote snapshot.
    ApplyingRemote,
    /// The room has not been read in this session.
    NoBaseline,
}

impl std::fmt::Display for PushBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushBlocked::Disabled => write!(f, "sync disabled"),
            PushBlocked::Connecting => write!(f, "still connecting"),
            PushBlocked::ApplyingRemote => write!(f, "applying remote snapshot"),
            PushBlocked::NoBaseline => write!(f, "room not read yet"),
        }
    }
}

/// What to do when the subscription reports the room document missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRoom {
    /// Recreate the room from local state.
    Recreate,
    /// Already handled in this session.
    Ignore,
}

/// Per-session push conditions. Pure state, no I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushGate {
    enabled: bool,
    connecting: bool,
    applying_remote: bool,
    baseline: bool,
}

impl PushGate {
    /// A closed gate: disabled, no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a push may be sent right now.
    pub fn check(&self) -> Result<(), PushBlocked> {
        if !self.enabled {
            return Err(PushBlocked::Disabled);
        }
        if self.connecting {
            return Err(PushBlocked::Connecting);
        }
        if self.applying_remote {
            return Err(PushBlocked::ApplyingRemote);
        }
        if !self.baseline {
            return Err(PushBlocked::NoBaseline);
        }
        Ok(())
    }

    /// Start a connect attempt. Clears the baseline from any earlier session.
    pub fn begin_connect(&mut self) {
        self.enabled = true;
        self.connecting = true;
        self.baseline = false;
    }

    /// Finish the connect/compare phase.
    pub fn end_connect(&mut self) {
        self.connecting = false;
    }

    /// Mark the start of a local apply of remote data.
    pub fn begin_apply(&mut self) {
        self.applying_remote = true;
    }

    /// Mark the end of a local apply of remote data.
    pub fn end_apply(&mut self) {
        self.applying_remote = false;
    }

    /// True while a remote snapshot is being applied.
    pub fn is_applying_remote(&self) -> bool {
        self.applying_remote
    }

    /// Record a successful read (or own create) of the room.
    pub fn mark_baseline(&mut self) {
        self.baseline = true;
    }

    /// Whether the room has been read in this session.
    pub fn has_baseline(&self) -> bool {
        self.baseline
    }

    /// Whether sync is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide how to react to a "room missing" notification.
    ///
    /// The first notification before any read recreates the room and
    /// satisfies the latch, so later notifications are ignored. Observing the
    /// document as missing counts as having read it.
    pub fn on_room_missing(&mut self) -> MissingRoom {
        if self.baseline {
            MissingRoom::Ignore
        } else {
            self.baseline = true;
            MissingRoom::Recreate
        }
    }

    /// Close the gate and forget the session's baseline.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_gate() -> PushGate {
        let mut gate = PushGate::new();
        gate.begin_connect();
        gate.mark_baseline();
        gate.end_connect();
        gate
    }

    #[test]
    fn new_gate_is_disabled() {
        assert_eq!(PushGate::new().check(), Err(PushBlocked::Disabled));
    }

    #[test]
    fn connecting_blocks_push() {
        let mut gate = PushGate::new();
        gate.begin_connect();
        gate.mark_baseline();
        assert_eq!(gate.check(), Err(PushBlocked::Connecting));
    }

    #[test]
    fn no_baseline_blocks_push_even_when_enabled() {
        let mut gate = PushGate::new();
        gate.begin_connect();
        gate.end_connect();
        assert_eq!(gate.check(), Err(PushBlocked::NoBaseline));
    }

    #[test]
    fn applying_remote_blocks_push() {
        let mut gate = open_gate();
        gate.begin_apply();
        assert_eq!(gate.check(), Err(PushBlocked::ApplyingRemote));
        gate.end_apply();
        assert_eq!(gate.check(), Ok(()));
    }

    #[test]
    fn reconnect_requires_a_new_baseline() {
        let mut gate = open_gate();
        gate.begin_connect();
        gate.end_connect();
        assert!(!gate.has_baseline());
    }

    #[test]
    fn room_missing_recreates_at_most_once() {
        let mut gate = PushGate::new();
        gate.begin_connect();
        gate.end_connect();

        assert_eq!(gate.on_room_missing(), MissingRoom::Recreate);
        assert_eq!(gate.on_room_missing(), MissingRoom::Ignore);
        assert!(gate.has_baseline());
        assert_eq!(gate.check(), Ok(()));
    }

    #[test]
    fn room_missing_after_read_is_ignored() {
        let mut gate = open_gate();
        assert_eq!(gate.on_room_missing(), MissingRoom::Ignore);
    }

    #[test]
    fn reset_closes_gate() {
        let mut gate = open_gate();
        gate.reset();
        assert_eq!(gate, PushGate::new());
        assert_eq!(gate.check(), Err(PushBlocked::Disabled));
    }

    #[test]
    fn blocked_reason_display() {
        assert_eq!(PushBlocked::NoBaseline.to_string(), "room not read yet");
    }
}
