//! Create or join a room.

use anyhow::{Context, Result};
use stellar_sync_client::SyncHost;
use stellar_sync_core::generate_room_code;

use super::Workspace;

/// Create a room from local data. Generates a code unless one is given.
pub async fn create(ws: &Workspace, code: Option<&str>) -> Result<()> {
    let engine = ws.engine()?;
    if let Some(previous) = engine.current_room_code() {
        println!("Leaving room {}", previous);
    }

    let code = match code {
        Some(code) => code.to_string(),
        None => generate_room_code().to_string(),
    };
    let room = engine
        .create_room(&code)
        .await
        .context("Failed to create room")?;
    let records = engine.host().snapshot()?.len();
    engine.shutdown();

    println!("Room created!");
    println!();
    println!("  Room code: {}", room);
    println!("  Records:   {}", records);
    println!();
    println!("On another device run:");
    println!("  stellar-sync pair --join {}", room);

    Ok(())
}

/// Join an existing room, replacing local data with the room's.
pub async fn join(ws: &Workspace, code: &str) -> Result<()> {
    let engine = ws.engine()?;
    let joined = engine
        .join_room(code)
        .await
        .context("Failed to join room")?;
    engine.shutdown();

    let Some(document) = joined else {
        anyhow::bail!(
            "Room {} not found. Check the code or create it with 'stellar-sync pair --create'.",
            code.trim().to_ascii_uppercase()
        );
    };

    let room = engine
        .current_room_code()
        .context("Room code missing after join")?;
    println!("Joined room {}", room);
    println!();
    println!("  Records: {}", document.snapshot.len());
    println!("  Updated: {}", super::format_timestamp(document.updated_at()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use stellar_sync_types::Record;

    #[tokio::test]
    async fn create_then_join_from_other_device() {
        let pair = testing::pair().await;
        pair.a
            .collections()
            .update(|s| s.todos.push(Record::new("t1").with_created_at(1)))
            .unwrap();

        create(&pair.a, Some("star-7x9k")).await.unwrap();
        join(&pair.b, "STAR-7X9K").await.unwrap();

        let session = pair.b.sessions().load().unwrap();
        assert_eq!(session.room_code.unwrap().as_str(), "STAR-7X9K");
        assert!(session.enabled);
        assert_eq!(pair.b.collections().load().unwrap().todos.len(), 1);
    }

    #[tokio::test]
    async fn create_generates_a_code() {
        let (ws, _dir) = testing::initialized().await;

        create(&ws, None).await.unwrap();

        let code = ws.sessions().load().unwrap().room_code.unwrap();
        assert!(code.as_str().contains('-'));
    }

    #[tokio::test]
    async fn join_missing_room_fails_and_stays_unpaired() {
        let (ws, _dir) = testing::initialized().await;

        let result = join(&ws, "NOVA-0000").await;

        assert!(result.unwrap_err().to_string().contains("not found"));
        assert!(ws.sessions().load().unwrap().room_code.is_none());
    }

    #[tokio::test]
    async fn invalid_code_is_rejected() {
        let (ws, _dir) = testing::initialized().await;

        assert!(create(&ws, Some("no spaces")).await.is_err());
    }
}
