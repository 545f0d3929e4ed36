//! Stay connected and print what the engine does.

use anyhow::{Context, Result};
use std::time::Duration;
use stellar_sync_core::{SyncEvent, SyncStatus};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::{connect, Workspace};

/// Run the watch command until Ctrl-C, or for `duration` if given.
pub async fn run(ws: &Workspace, duration: Option<Duration>) -> Result<()> {
    let engine = ws.engine()?;
    let mut events = engine.events();
    if !connect(&engine).await? {
        anyhow::bail!("Not in a room. Run 'stellar-sync pair' first.");
    }
    let code = engine
        .current_room_code()
        .context("Room code missing after connect")?;
    println!("Watching room {} (Ctrl-C to stop)", code);

    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut failure = None;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut interrupted => break,
            event = events.recv() => match event {
                Ok(event) => {
                    println!("{}", describe(&event));
                    if let SyncEvent::StatusChanged(SyncStatus::Error { error, .. }) = event {
                        failure = Some(error);
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    engine.shutdown();

    match failure {
        Some(error) => anyhow::bail!("Room subscription failed: {}", error),
        None => Ok(()),
    }
}

/// One line for an engine event.
pub fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::StatusChanged(status) => format!("status: {}", describe_status(status)),
        SyncEvent::RemoteApplied { records, .. } => {
            format!("applied {} records from the room", records)
        }
        SyncEvent::Pushed { .. } => "pushed local changes".to_string(),
        SyncEvent::PushFailed { error } => format!("push failed: {}", error),
        SyncEvent::RoomRecreated { room_code } => {
            format!("room {} was missing; recreated from local data", room_code)
        }
    }
}

fn describe_status(status: &SyncStatus) -> String {
    match status {
        SyncStatus::Disconnected => "disconnected".to_string(),
        SyncStatus::Connecting { room_code } => format!("connecting to {}", room_code),
        SyncStatus::Connected { room_code } => format!("connected to {}", room_code),
        SyncStatus::Error { room_code, error } => format!("error on {}: {}", room_code, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{pair, records, testing};
    use stellar_sync_types::{RecordKind, RoomCode};

    #[test]
    fn describes_events() {
        let code = RoomCode::parse("STAR-7X9K").unwrap();

        assert_eq!(
            describe(&SyncEvent::StatusChanged(SyncStatus::Connected {
                room_code: code.clone()
            })),
            "status: connected to STAR-7X9K"
        );
        assert_eq!(
            describe(&SyncEvent::RemoteApplied {
                records: 3,
                updated_at: 1
            }),
            "applied 3 records from the room"
        );
        assert!(describe(&SyncEvent::RoomRecreated { room_code: code }).contains("recreated"));
    }

    #[tokio::test]
    async fn watch_without_room_fails() {
        let (ws, _dir) = testing::initialized().await;

        assert!(run(&ws, Some(Duration::from_millis(10))).await.is_err());
    }

    #[tokio::test]
    async fn watch_applies_edits_from_another_device() {
        let pair = testing::pair().await;
        pair::create(&pair.a, Some("ORION-7777")).await.unwrap();
        pair::join(&pair.b, "ORION-7777").await.unwrap();

        let (watched, edited) = tokio::join!(
            run(&pair.a, Some(Duration::from_millis(2000))),
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                records::add(&pair.b, RecordKind::Todos, "from b").await
            }
        );
        watched.unwrap();
        edited.unwrap();

        assert_eq!(pair.a.collections().load().unwrap().todos.len(), 1);
    }
}
