//! Change Subscriber.
//!
//! Opens a long-lived watch on a room document and forwards its events to a
//! [`SubscriptionHandler`]. Snapshots written by this device are delivered
//! too; filtering self-echoes is the orchestrator's job.

use async_trait::async_trait;
use stellar_sync_types::{RemoteDocument, RoomCode};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::remote::{RemoteStore, TransportError, WatchEvent};
use crate::room::room_key;

/// Callbacks for a live subscription.
#[async_trait]
pub trait SubscriptionHandler: Send + Sync + 'static {
    /// The room document changed (or this is its current state).
    async fn on_snapshot(&self, document: RemoteDocument);

    /// The transport failed. The subscription is dead afterwards.
    async fn on_error(&self, error: TransportError);

    /// The room document does not exist.
    async fn on_room_missing(&self);
}

/// Opens subscriptions on a remote store.
#[derive(Debug, Clone)]
pub struct ChangeSubscriber<R> {
    remote: R,
}

impl<R: RemoteStore> ChangeSubscriber<R> {
    /// Create a subscriber over `remote`.
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Subscribe to the room for `code`.
    ///
    /// Fails only if the watch cannot be opened. Events are delivered one at
    /// a time, in order, on a background task.
    pub async fn subscribe<H: SubscriptionHandler>(
        &self,
        code: &RoomCode,
        handler: H,
    ) -> Result<Subscription, TransportError> {
        let mut stream = self.remote.watch(&room_key(code)).await?;
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let room = code.clone();

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => break,
                    event = stream.next() => event,
                };

                // Unsubscribed while waiting: drop the event.
                if *cancel_rx.borrow() {
                    break;
                }

                match event {
                    Some(WatchEvent::Snapshot(Some(document))) => handler.on_snapshot(document).await,
                    Some(WatchEvent::Snapshot(None)) => handler.on_room_missing().await,
                    Some(WatchEvent::Error(error)) => {
                        handler.on_error(error).await;
                        break;
                    }
                    None => {
                        handler.on_error(TransportError::Closed).await;
                        break;
                    }
                }
            }
            debug!(%room, "subscription ended");
        });

        Ok(Subscription {
            cancel: cancel_tx,
            task,
        })
    }
}

/// Handle to a live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivering callbacks. Idempotent.
    ///
    /// A callback that is already running completes; no further callback
    /// starts.
    pub fn unsubscribe(&self) {
        self.cancel.send_replace(true);
    }

    /// True until unsubscribed or until the subscription died.
    pub fn is_active(&self) -> bool {
        !*self.cancel.borrow() && !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{DocumentWrite, MemoryRemote};
    use std::sync::Mutex;
    use std::time::Duration;
    use stellar_sync_types::{DeviceId, Snapshot};
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Snapshot(usize),
        Missing,
        Error,
    }

    struct Recorder {
        tx: mpsc::UnboundedSender<Seen>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl SubscriptionHandler for Recorder {
        async fn on_snapshot(&self, document: RemoteDocument) {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let _ = self.tx.send(Seen::Snapshot(document.snapshot.len()));
        }

        async fn on_error(&self, _error: TransportError) {
            let _ = self.tx.send(Seen::Error);
        }

        async fn on_room_missing(&self) {
            let _ = self.tx.send(Seen::Missing);
        }
    }

    fn recorder() -> (Recorder, mpsc::UnboundedReceiver<Seen>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Recorder { tx, delay: None }, rx)
    }

    fn code() -> RoomCode {
        RoomCode::parse("STAR-7X9K").unwrap()
    }

    async fn write(remote: &MemoryRemote, records: usize) {
        let mut snapshot = Snapshot::new();
        for i in 0..records {
            snapshot
                .notes
                .push(stellar_sync_types::Record::new(format!("n{}", i)));
        }
        remote
            .set(&room_key(&code()), DocumentWrite::new(snapshot, DeviceId::new("dev-a")))
            .await
            .unwrap();
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn missing_room_is_reported() {
        let remote = MemoryRemote::new();
        let (handler, mut seen) = recorder();

        let _sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();

        assert_eq!(seen.recv().await, Some(Seen::Missing));
    }

    #[tokio::test]
    async fn delivers_every_write() {
        let remote = MemoryRemote::new();
        write(&remote, 1).await;
        let (handler, mut seen) = recorder();

        let _sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();
        write(&remote, 2).await;
        write(&remote, 3).await;

        assert_eq!(seen.recv().await, Some(Seen::Snapshot(1)));
        assert_eq!(seen.recv().await, Some(Seen::Snapshot(2)));
        assert_eq!(seen.recv().await, Some(Seen::Snapshot(3)));
    }

    #[tokio::test]
    async fn deletion_after_subscribe_is_reported_as_missing() {
        let remote = MemoryRemote::new();
        write(&remote, 1).await;
        let (handler, mut seen) = recorder();
        let _sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();
        assert_eq!(seen.recv().await, Some(Seen::Snapshot(1)));

        remote.delete(&room_key(&code()));

        assert_eq!(seen.recv().await, Some(Seen::Missing));
    }

    #[tokio::test]
    async fn error_ends_subscription() {
        let remote = MemoryRemote::new();
        let (handler, mut seen) = recorder();
        let sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();
        assert_eq!(seen.recv().await, Some(Seen::Missing));

        remote.break_watchers(&room_key(&code()), "permission denied");

        assert_eq!(seen.recv().await, Some(Seen::Error));
        // Handler dropped with the task: channel closes, nothing else arrives.
        assert_eq!(seen.recv().await, None);
        settle().await;
        assert!(!sub.is_active());
    }

    #[tokio::test]
    async fn watch_failure_is_returned() {
        let remote = MemoryRemote::new();
        remote.fail_next_watch("offline");
        let (handler, _seen) = recorder();

        let result = ChangeSubscriber::new(remote).subscribe(&code(), handler).await;

        assert!(matches!(result, Err(TransportError::Unavailable(_))));
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent_and_stops_callbacks() {
        let remote = MemoryRemote::new();
        let (handler, mut seen) = recorder();
        let sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();
        assert_eq!(seen.recv().await, Some(Seen::Missing));

        sub.unsubscribe();
        sub.unsubscribe();
        write(&remote, 1).await;
        settle().await;

        assert!(!sub.is_active());
        assert_eq!(seen.recv().await, None);
    }

    #[tokio::test]
    async fn running_callback_completes_after_unsubscribe() {
        let remote = MemoryRemote::new();
        write(&remote, 1).await;
        let (tx, mut seen) = mpsc::unbounded_channel();
        let handler = Recorder {
            tx,
            delay: Some(Duration::from_millis(50)),
        };
        let sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();

        // Let the first callback start, then cancel mid-flight.
        tokio::time::sleep(Duration::from_millis(10)).await;
        sub.unsubscribe();
        write(&remote, 2).await;

        assert_eq!(seen.recv().await, Some(Seen::Snapshot(1)));
        assert_eq!(seen.recv().await, None);
    }

    #[tokio::test]
    async fn drop_unsubscribes() {
        let remote = MemoryRemote::new();
        let (handler, mut seen) = recorder();
        let sub = ChangeSubscriber::new(remote.clone())
            .subscribe(&code(), handler)
            .await
            .unwrap();
        assert_eq!(seen.recv().await, Some(Seen::Missing));

        drop(sub);
        write(&remote, 1).await;

        assert_eq!(seen.recv().await, None);
    }
}
