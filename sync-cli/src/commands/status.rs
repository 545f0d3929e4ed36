//! Show sync status.

use anyhow::Result;
use stellar_sync_client::SyncHost;
use stellar_sync_types::RecordKind;

use super::{format_timestamp, Workspace};

/// Run the status command. Reads local state only.
pub async fn run(ws: &Workspace) -> Result<()> {
    println!("=== stellar-sync status ===");
    println!();

    if !ws.is_initialized()? {
        println!("Device: NOT INITIALIZED");
        println!();
        println!("Run 'stellar-sync init' to initialize.");
        return Ok(());
    }

    let session = ws.sessions().load()?;
    println!("Device:");
    println!("  ID:    {}", session.device_id);
    println!("  Rooms: {}", ws.remote_dir().display());
    println!();

    match &session.room_code {
        Some(code) => {
            println!("Room:");
            println!("  Code:   {}", code);
            println!("  Sync:   {}", if session.enabled { "ON" } else { "OFF" });
            let synced = session
                .last_synced_at
                .map(format_timestamp)
                .unwrap_or_else(|| "never".to_string());
            println!("  Synced: {}", synced);
        }
        None => {
            println!("Room: NOT PAIRED");
            println!();
            println!("Run 'stellar-sync pair --create' or 'stellar-sync pair --join <code>'");
        }
    }

    println!();
    let collections = ws.collections();
    let snapshot = collections.load()?;
    println!("Local data:");
    for kind in RecordKind::ALL {
        println!("  {:<9} {}", format!("{}:", kind), snapshot.records(kind).len());
    }
    if let Some(edited) = collections.local_updated_at()? {
        println!("  Edited:   {}", format_timestamp(edited));
    }

    Ok(())
}
