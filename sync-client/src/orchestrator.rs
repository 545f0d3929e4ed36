//! Sync Orchestrator - the stateful coordinator.
//!
//! [`SyncOrchestrator`] drives the pure pieces from sync-core and performs
//! the I/O they decide on:
//!
//! ```text
//! Application (SyncHost) ⇄ SyncOrchestrator → RoomClient → RemoteStore
//!                               ↓        ↖ ChangeSubscriber ↙
//!                 sync-core (status machine, gate, direction, merge)
//! ```
//!
//! Every connect attempt, disconnect and shutdown bumps a generation counter.
//! Asynchronous continuations (reads, writes, subscription callbacks,
//! debounce timers) capture the generation they started under and become
//! no-ops once it is stale, so a slow response can never touch a later
//! session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use stellar_sync_core::{
    decide, generate_room_code, merge_snapshots, Action, Direction, Event, MissingRoom,
    PushBlocked, PushGate, SyncEvent, SyncSides, SyncStatus,
};
use stellar_sync_types::{DeviceId, RemoteDocument, RoomCode, SessionState, Snapshot};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::host::SyncHost;
use crate::remote::{RemoteStore, TransportError};
use crate::room::{RoomClient, WriteMode};
use crate::session::SessionStore;
use crate::store::LocalStore;
use crate::subscriber::{ChangeSubscriber, Subscription, SubscriptionHandler};

/// Result of a push request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The local snapshot was written.
    Pushed {
        /// Server write time.
        updated_at: u64,
    },
    /// Nothing was written.
    Skipped(PushBlocked),
}

/// Result of [`SyncOrchestrator::force_sync`]. Local state has already been
/// updated through the host when data came from the room.
#[derive(Debug, Clone, PartialEq)]
pub enum ForceSyncOutcome {
    /// The room was newer; its snapshot was applied locally.
    Pulled(Snapshot),
    /// Local data was newer (or the room was missing); it was written.
    Pushed {
        /// Server write time.
        updated_at: u64,
    },
    /// Both sides changed around the same time; the merge was written and
    /// applied locally.
    Merged(Snapshot),
}

/// The sync engine for one device.
///
/// Cloning is cheap; clones share the same engine.
pub struct SyncOrchestrator<R, S, H> {
    inner: Arc<Inner<R, S, H>>,
}

impl<R, S, H> Clone for SyncOrchestrator<R, S, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R, S, H> {
    config: SyncConfig,
    room: RoomClient<R, S>,
    subscriber: ChangeSubscriber<R>,
    host: H,
    device_id: DeviceId,
    session: Mutex<SessionState>,
    gate: Mutex<PushGate>,
    status: Mutex<SyncStatus>,
    generation: AtomicU64,
    subscription: Mutex<Option<Subscription>>,
    pending_push: Mutex<Option<JoinHandle<()>>>,
    push_seq: AtomicU64,
    push_lock: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SyncEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R, S, H> SyncOrchestrator<R, S, H>
where
    R: RemoteStore + Clone + 'static,
    S: LocalStore + 'static,
    H: SyncHost + 'static,
{
    /// Create an orchestrator. Loads (or creates) the session from `store`.
    ///
    /// Sync starts switched off; call [`enable`](Self::enable) to reconnect a
    /// stored room, or create/join one.
    pub fn new(remote: R, store: S, host: H, config: SyncConfig) -> Result<Self, SyncError> {
        let sessions = SessionStore::new(store);
        let session = sessions.load()?;
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            inner: Arc::new(Inner {
                subscriber: ChangeSubscriber::new(remote.clone()),
                room: RoomClient::new(remote, sessions),
                device_id: session.device_id.clone(),
                session: Mutex::new(session),
                gate: Mutex::new(PushGate::new()),
                status: Mutex::new(SyncStatus::new()),
                generation: AtomicU64::new(0),
                subscription: Mutex::new(None),
                pending_push: Mutex::new(None),
                push_seq: AtomicU64::new(0),
                push_lock: tokio::sync::Mutex::new(()),
                events,
                config,
                host,
            }),
        })
    }

    /// Generate a random room code.
    pub fn generate_room_code() -> RoomCode {
        generate_room_code()
    }

    /// Reconnect to the stored room.
    ///
    /// Reads the room once and applies the direction rule (pull, push or
    /// merge), then subscribes. Returns what the direction rule did, or
    /// `None` if the room was missing; the subscription then recreates it
    /// from local state.
    pub async fn enable(&self) -> Result<Option<ForceSyncOutcome>, SyncError> {
        let code = self
            .current_room_code()
            .ok_or(SyncError::NotConfigured)?;
        self.inner.update_session(|s| s.enabled = true)?;

        let generation = self.inner.begin_connect(&code)?;
        match self.inner.connect_known_room(generation, &code).await {
            Ok(outcome) => {
                self.inner.finish_connect(generation, Ok(()))?;
                Ok(outcome)
            }
            Err(error) => self.inner.finish_connect(generation, Err(error)).map(|_| None),
        }
    }

    /// Create a room from the current local snapshot and subscribe to it.
    ///
    /// The code is normalized to upper case. An existing room with the same
    /// code is overwritten unless [`SyncConfig::reject_existing_rooms`] is set.
    pub async fn create_room(&self, code: &str) -> Result<RoomCode, SyncError> {
        let code = RoomCode::parse(code)?;
        if self.inner.config.reject_existing_rooms
            && self.inner.room.one_shot_pull(&code).await?.is_some()
        {
            return Err(SyncError::RoomExists(code));
        }

        let generation = self.inner.begin_connect(&code)?;
        let result = self.inner.connect_new_room(generation, &code).await;
        self.inner.finish_connect(generation, result)?;
        Ok(code)
    }

    /// Join an existing room, adopting its contents locally.
    ///
    /// Returns `None` (and ends up disconnected) if the room does not exist.
    pub async fn join_room(&self, code: &str) -> Result<Option<RemoteDocument>, SyncError> {
        let code = RoomCode::parse(code)?;
        let generation = self.inner.begin_connect(&code)?;

        match self.inner.connect_joined_room(generation, &code).await {
            Ok(Some(document)) => {
                self.inner.finish_connect(generation, Ok(()))?;
                Ok(Some(document))
            }
            Ok(None) => {
                if self.inner.is_current(generation) {
                    info!(room = %code, "room not found");
                    lock(&self.inner.gate).reset();
                    self.inner.dispatch(Event::RoomNotFound)?;
                }
                Ok(None)
            }
            Err(error) => self.inner.finish_connect(generation, Err(error)).map(|_| None),
        }
    }

    /// Turn sync off: cancel the pending push, unsubscribe and clear the room
    /// code and enabled flag. The device id is kept. Idempotent.
    pub fn disconnect(&self) -> Result<(), SyncError> {
        self.inner.invalidate();
        lock(&self.inner.gate).reset();
        self.inner.dispatch(Event::DisconnectRequested)
    }

    /// Tear down without forgetting the room: cancel the pending push,
    /// unsubscribe and drop in-flight work. [`enable`](Self::enable)
    /// resumes.
    pub fn shutdown(&self) {
        self.inner.invalidate();
        lock(&self.inner.gate).reset();
        if let Err(error) = self.inner.dispatch(Event::ShutdownRequested) {
            warn!(%error, "shutdown");
        }
    }

    /// Report a local edit. Schedules a push after the debounce window;
    /// later calls supersede earlier ones.
    ///
    /// Calls made while a remote snapshot is being applied are ignored. Must
    /// be called from within a Tokio runtime.
    pub fn notify_local_change(&self) {
        self.inner.schedule_push();
    }

    /// Push now, cancelling any pending debounced push. A debounced push
    /// that is already writing finishes first. Call this when the
    /// application is about to be suspended.
    pub async fn flush(&self) -> Result<PushOutcome, SyncError> {
        self.inner.supersede_pending_push();
        self.inner.push_now().await
    }

    /// Push the current local snapshot if the gate allows it.
    ///
    /// Before the room has been read in this session the push is skipped
    /// with [`PushBlocked::NoBaseline`] (or an earlier reason).
    pub async fn push_changes(&self) -> Result<PushOutcome, SyncError> {
        self.inner.push_now().await
    }

    /// Read the room now and apply the direction rule.
    pub async fn force_sync(&self) -> Result<ForceSyncOutcome, SyncError> {
        self.inner.force_sync().await
    }

    /// Subscribe to engine events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        lock(&self.inner.status).clone()
    }

    /// Whether sync is switched on in the session.
    pub fn is_enabled(&self) -> bool {
        lock(&self.inner.session).enabled
    }

    /// Room code in the session.
    pub fn current_room_code(&self) -> Option<RoomCode> {
        lock(&self.inner.session).room_code.clone()
    }

    /// Server time of the last successful push or pull.
    pub fn last_synced_at(&self) -> Option<u64> {
        lock(&self.inner.session).last_synced_at
    }

    /// This installation's device id.
    pub fn device_id(&self) -> &DeviceId {
        &self.inner.device_id
    }

    /// The application host.
    pub fn host(&self) -> &H {
        &self.inner.host
    }
}

impl<R, S, H> Inner<R, S, H>
where
    R: RemoteStore + Clone + 'static,
    S: LocalStore + 'static,
    H: SyncHost + 'static,
{
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn ensure_current(&self, generation: u64) -> Result<(), SyncError> {
        if self.is_current(generation) {
            Ok(())
        } else {
            Err(SyncError::Cancelled)
        }
    }

    /// Start a new generation. Everything in flight becomes stale.
    fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn emit(&self, event: SyncEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    fn update_session(&self, f: impl FnOnce(&mut SessionState)) -> Result<(), SyncError> {
        let mut session = lock(&self.session);
        let mut next = session.clone();
        f(&mut next);
        self.room.sessions().save(&next)?;
        *session = next;
        Ok(())
    }

    /// Run the status machine and execute its actions.
    fn dispatch(&self, event: Event) -> Result<(), SyncError> {
        let actions = {
            let mut status = lock(&self.status);
            let (next, actions) = status.clone().on_event(event);
            *status = next;
            actions
        };

        for action in actions {
            match action {
                Action::CancelPendingPush => self.cancel_pending_push(),
                Action::Unsubscribe => self.drop_subscription(),
                Action::ClearSession => self.update_session(SessionState::disconnect)?,
                Action::EmitEvent(event) => self.emit(event),
            }
        }
        Ok(())
    }

    /// Invalidate the debounce timer that is waiting, if any. Returns the
    /// sequence number for the next timer.
    fn supersede_pending_push(&self) -> u64 {
        self.push_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Teardown: invalidate the waiting timer and abort the latest push task.
    fn cancel_pending_push(&self) {
        self.supersede_pending_push();
        if let Some(handle) = lock(&self.pending_push).take() {
            handle.abort();
        }
    }

    fn drop_subscription(&self) {
        let subscription = lock(&self.subscription).take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }

    fn begin_connect(&self, code: &RoomCode) -> Result<u64, SyncError> {
        let generation = self.invalidate();
        self.cancel_pending_push();
        self.drop_subscription();
        lock(&self.gate).begin_connect();
        self.dispatch(Event::ConnectRequested {
            room_code: code.clone(),
        })?;
        Ok(generation)
    }

    fn finish_connect(&self, generation: u64, result: Result<(), SyncError>) -> Result<(), SyncError> {
        match result {
            Ok(()) if self.is_current(generation) => {
                lock(&self.gate).end_connect();
                self.dispatch(Event::ConnectSucceeded)
            }
            Ok(()) | Err(SyncError::Cancelled) => {
                debug!("connect attempt superseded");
                Err(SyncError::Cancelled)
            }
            Err(error) => {
                if self.is_current(generation) {
                    warn!(%error, "connect failed");
                    lock(&self.gate).reset();
                    self.dispatch(Event::ConnectFailed {
                        error: error.to_string(),
                    })?;
                }
                Err(error)
            }
        }
    }

    /// Effective local timestamp: the later of the last local edit and the
    /// last successful sync.
    fn local_updated_at(&self) -> Result<u64, SyncError> {
        let edited = self.host.local_updated_at()?;
        let synced = lock(&self.session).last_synced_at;
        Ok(edited.max(synced).unwrap_or(0))
    }

    fn check_gate(&self) -> Result<(), PushBlocked> {
        lock(&self.gate).check()
    }

    fn apply_remote(
        &self,
        generation: u64,
        snapshot: &Snapshot,
        updated_at: u64,
    ) -> Result<(), SyncError> {
        self.ensure_current(generation)?;

        lock(&self.gate).begin_apply();
        let applied = self.host.apply_remote(snapshot);
        lock(&self.gate).end_apply();
        applied?;

        self.update_session(|s| s.record_sync(Some(updated_at)))?;
        self.emit(SyncEvent::RemoteApplied {
            records: snapshot.len(),
            updated_at,
        });
        Ok(())
    }

    /// Write to the room and record the sync. Callers check the gate.
    async fn write_room(
        &self,
        generation: u64,
        code: &RoomCode,
        snapshot: &Snapshot,
        mode: WriteMode,
    ) -> Result<RemoteDocument, SyncError> {
        match self.room.write(code, snapshot, mode).await {
            Ok(document) => {
                if self.is_current(generation) {
                    self.update_session(|s| s.record_sync(document.last_updated))?;
                    self.emit(SyncEvent::Pushed {
                        updated_at: document.updated_at(),
                    });
                }
                Ok(document)
            }
            Err(error) => {
                warn!(room = %code, %error, "push failed; retrying on next change");
                self.emit(SyncEvent::PushFailed {
                    error: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Connect-phase write: only the generation, enabled flag and baseline
    /// are checked, since the phase itself holds ordinary pushes back.
    async fn write_during_connect(
        &self,
        generation: u64,
        code: &RoomCode,
        snapshot: &Snapshot,
    ) -> Result<RemoteDocument, SyncError> {
        self.ensure_current(generation)?;
        let allowed = {
            let gate = lock(&self.gate);
            gate.is_enabled() && gate.has_baseline()
        };
        if !allowed {
            return Err(SyncError::Cancelled);
        }
        self.write_room(generation, code, snapshot, WriteMode::Merge).await
    }

    async fn reconcile(
        &self,
        generation: u64,
        code: &RoomCode,
        document: RemoteDocument,
    ) -> Result<ForceSyncOutcome, SyncError> {
        let local = self.host.snapshot()?;
        let sides = SyncSides::new(&local, self.local_updated_at()?, &document);
        let direction = decide(&sides, self.config.merge_window);
        info!(
            room = %code,
            ?direction,
            local_updated_at = sides.local_updated_at,
            remote_updated_at = sides.remote_updated_at,
            "reconciling with room"
        );

        match direction {
            Direction::Pull => {
                self.apply_remote(generation, &document.snapshot, document.updated_at())?;
                Ok(ForceSyncOutcome::Pulled(document.snapshot))
            }
            Direction::Push => {
                let written = self.write_during_connect(generation, code, &local).await?;
                Ok(ForceSyncOutcome::Pushed {
                    updated_at: written.updated_at(),
                })
            }
            Direction::Merge => {
                let merged = merge_snapshots(&local, &document.snapshot);
                let written = self.write_during_connect(generation, code, &merged).await?;
                self.apply_remote(generation, &merged, written.updated_at())?;
                Ok(ForceSyncOutcome::Merged(merged))
            }
        }
    }

    async fn connect_known_room(
        self: &Arc<Self>,
        generation: u64,
        code: &RoomCode,
    ) -> Result<Option<ForceSyncOutcome>, SyncError> {
        let remote = self.room.one_shot_pull(code).await?;
        self.ensure_current(generation)?;

        let outcome = match remote {
            Some(document) => {
                lock(&self.gate).mark_baseline();
                Some(self.reconcile(generation, code, document).await?)
            }
            None => {
                info!(room = %code, "room missing; recreating from local state");
                None
            }
        };

        self.attach(generation, code).await?;
        Ok(outcome)
    }

    async fn connect_new_room(
        self: &Arc<Self>,
        generation: u64,
        code: &RoomCode,
    ) -> Result<(), SyncError> {
        let snapshot = self.host.snapshot()?;
        self.ensure_current(generation)?;

        let document = self.room.write(code, &snapshot, WriteMode::Overwrite).await?;
        self.ensure_current(generation)?;
        lock(&self.gate).mark_baseline();
        self.update_session(|s| s.enter_room(code.clone(), document.last_updated))?;
        info!(room = %code, records = snapshot.len(), "created room");

        self.attach(generation, code).await
    }

    async fn connect_joined_room(
        self: &Arc<Self>,
        generation: u64,
        code: &RoomCode,
    ) -> Result<Option<RemoteDocument>, SyncError> {
        let Some(document) = self.room.one_shot_pull(code).await? else {
            return Ok(None);
        };
        self.ensure_current(generation)?;

        lock(&self.gate).mark_baseline();
        self.update_session(|s| s.enter_room(code.clone(), document.last_updated))?;
        self.apply_remote(generation, &document.snapshot, document.updated_at())?;
        info!(room = %code, records = document.snapshot.len(), "joined room");

        self.attach(generation, code).await?;
        Ok(Some(document))
    }

    async fn attach(self: &Arc<Self>, generation: u64, code: &RoomCode) -> Result<(), SyncError> {
        let handler = RoomHandler {
            inner: Arc::downgrade(self),
            generation,
            room_code: code.clone(),
        };
        let subscription = self.subscriber.subscribe(code, handler).await?;

        let mut slot = lock(&self.subscription);
        // A stale subscription is dropped here, which unsubscribes it.
        self.ensure_current(generation)?;
        *slot = Some(subscription);
        Ok(())
    }

    fn schedule_push(self: &Arc<Self>) {
        {
            let gate = lock(&self.gate);
            if gate.is_applying_remote() {
                debug!("ignoring change caused by remote apply");
                return;
            }
            if !gate.is_enabled() {
                return;
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let inner = Arc::downgrade(self);
        let delay = self.config.debounce;

        // Only the wait is superseded. An earlier push that already started
        // writing runs to completion.
        let mut pending = lock(&self.pending_push);
        let seq = self.supersede_pending_push();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if inner.is_current(generation) && inner.push_seq.load(Ordering::SeqCst) == seq {
                inner.debounced_push().await;
            }
        }));
    }

    async fn debounced_push(&self) {
        match self.push_now().await {
            Ok(_) => {}
            Err(SyncError::Cancelled) => debug!("debounced push superseded"),
            // Already logged and reported by write_room.
            Err(SyncError::Transport(_)) => {}
            Err(error) => {
                warn!(%error, "push failed; retrying on next change");
                self.emit(SyncEvent::PushFailed {
                    error: error.to_string(),
                });
            }
        }
    }

    async fn push_now(&self) -> Result<PushOutcome, SyncError> {
        // One write at a time, so the latest snapshot is always written last.
        let _writing = self.push_lock.lock().await;
        let generation = self.generation.load(Ordering::SeqCst);
        if let Err(blocked) = self.check_gate() {
            debug!(%blocked, "push suppressed");
            return Ok(PushOutcome::Skipped(blocked));
        }

        let code = self.current_room()?;
        let snapshot = self.host.snapshot()?;

        // Flags may have changed while local state was read.
        if let Err(blocked) = self.check_gate() {
            debug!(%blocked, "push suppressed");
            return Ok(PushOutcome::Skipped(blocked));
        }

        let document = self
            .write_room(generation, &code, &snapshot, WriteMode::Merge)
            .await?;
        debug!(room = %code, records = snapshot.len(), "pushed local changes");
        Ok(PushOutcome::Pushed {
            updated_at: document.updated_at(),
        })
    }

    fn current_room(&self) -> Result<RoomCode, SyncError> {
        lock(&self.session)
            .room_code
            .clone()
            .ok_or(SyncError::NotConfigured)
    }

    async fn force_sync(&self) -> Result<ForceSyncOutcome, SyncError> {
        let code = self.current_room()?;
        let enabled = lock(&self.gate).is_enabled();
        if !enabled {
            return Err(SyncError::Disabled);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let remote = self.room.one_shot_pull(&code).await?;
        self.ensure_current(generation)?;
        lock(&self.gate).mark_baseline();

        match remote {
            Some(document) => self.reconcile(generation, &code, document).await,
            None => {
                let snapshot = self.host.snapshot()?;
                let written = self
                    .write_room(generation, &code, &snapshot, WriteMode::Overwrite)
                    .await?;
                self.emit(SyncEvent::RoomRecreated { room_code: code });
                Ok(ForceSyncOutcome::Pushed {
                    updated_at: written.updated_at(),
                })
            }
        }
    }

    fn on_remote_snapshot(&self, generation: u64, document: RemoteDocument) {
        lock(&self.gate).mark_baseline();

        if document.written_by(&self.device_id) {
            debug!(updated_at = document.updated_at(), "discarding self-echo");
            return;
        }

        debug!(
            writer = %document.device_id,
            updated_at = document.updated_at(),
            "applying remote snapshot"
        );
        if let Err(error) = self.apply_remote(generation, &document.snapshot, document.updated_at()) {
            warn!(%error, "failed to apply remote snapshot");
        }
    }

    fn on_subscription_error(&self, error: TransportError) {
        warn!(%error, "room subscription failed");
        lock(&self.gate).reset();
        if let Err(error) = self.dispatch(Event::SubscriptionFailed {
            error: error.to_string(),
        }) {
            warn!(%error, "subscription failure");
        }
    }

    async fn on_room_missing(&self, generation: u64, code: &RoomCode) {
        let decision = lock(&self.gate).on_room_missing();
        match decision {
            MissingRoom::Ignore => debug!(room = %code, "room missing again; ignored"),
            MissingRoom::Recreate => {
                if let Err(error) = self.recreate_room(generation, code).await {
                    warn!(room = %code, %error, "failed to recreate room");
                }
            }
        }
    }

    async fn recreate_room(&self, generation: u64, code: &RoomCode) -> Result<(), SyncError> {
        let snapshot = self.host.snapshot()?;
        self.ensure_current(generation)?;
        let enabled = lock(&self.gate).is_enabled();
        if !enabled {
            return Err(SyncError::Disabled);
        }

        self.write_room(generation, code, &snapshot, WriteMode::Overwrite)
            .await?;
        self.ensure_current(generation)?;
        info!(room = %code, records = snapshot.len(), "recreated missing room");
        self.emit(SyncEvent::RoomRecreated {
            room_code: code.clone(),
        });
        Ok(())
    }
}

/// Subscription callbacks bound to one connect generation.
struct RoomHandler<R, S, H> {
    inner: Weak<Inner<R, S, H>>,
    generation: u64,
    room_code: RoomCode,
}

impl<R, S, H> RoomHandler<R, S, H> {
    fn live(&self) -> Option<Arc<Inner<R, S, H>>> {
        let inner = self.inner.upgrade()?;
        (inner.generation.load(Ordering::SeqCst) == self.generation).then_some(inner)
    }
}

#[async_trait]
impl<R, S, H> SubscriptionHandler for RoomHandler<R, S, H>
where
    R: RemoteStore + Clone + 'static,
    S: LocalStore + 'static,
    H: SyncHost + 'static,
{
    async fn on_snapshot(&self, document: RemoteDocument) {
        if let Some(inner) = self.live() {
            inner.on_remote_snapshot(self.generation, document);
        }
    }

    async fn on_error(&self, error: TransportError) {
        if let Some(inner) = self.live() {
            inner.on_subscription_error(error);
        }
    }

    async fn on_room_missing(&self) {
        if let Some(inner) = self.live() {
            inner.on_room_missing(self.generation, &self.room_code).await;
        }
    }
}
