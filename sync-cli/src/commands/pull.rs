//! Pull the room into local data.

use anyhow::{Context, Result};
use stellar_sync_client::{RoomClient, SyncError, SyncHost};

use super::{format_timestamp, Workspace};

/// Run the pull command.
///
/// Reads the room once and replaces local data with it. With `dry_run` the
/// room is only summarized.
pub async fn run(ws: &Workspace, dry_run: bool) -> Result<()> {
    ws.require_initialized()?;
    let sessions = ws.sessions();
    let code = sessions
        .load()?
        .room_code
        .context("Not in a room. Run 'stellar-sync pair' first.")?;

    let room = RoomClient::new(ws.remote(), sessions);
    // A real pull rejoins the room, which records the sync time.
    let pulled = if dry_run {
        room.one_shot_pull(&code).await.map_err(SyncError::from)
    } else {
        room.join_room(&code).await
    };
    let Some(document) = pulled.context("Pull failed")? else {
        anyhow::bail!(
            "Room {} no longer exists. Run 'stellar-sync sync' to recreate it from local data.",
            code
        );
    };

    println!("Room {}", code);
    println!("  Todos:    {}", document.snapshot.todos.len());
    println!("  Routines: {}", document.snapshot.routines.len());
    println!("  Notes:    {}", document.snapshot.notes.len());
    println!("  Updated:  {}", format_timestamp(document.updated_at()));
    println!("  Writer:   {}", document.device_id);

    if dry_run {
        return Ok(());
    }

    ws.collections().apply_remote(&document.snapshot)?;
    println!();
    println!("Local data replaced with {} records", document.snapshot.len());

    Ok(())
}
