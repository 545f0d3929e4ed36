//! Reconcile local data with the room.

use anyhow::{Context, Result};
use stellar_sync_client::ForceSyncOutcome;

use super::Workspace;

/// Run the sync command.
///
/// Connecting already reconciles with the room. Only a missing room needs
/// a second pass, which writes local data back before the engine shuts down.
pub async fn run(ws: &Workspace) -> Result<()> {
    let engine = ws.engine()?;
    if !engine.is_enabled() || engine.current_room_code().is_none() {
        anyhow::bail!("Not in a room. Run 'stellar-sync pair' first.");
    }

    let outcome = match engine.enable().await.context("Failed to reach the room") {
        Ok(Some(outcome)) => Ok(outcome),
        Ok(None) => engine.force_sync().await.context("Sync failed"),
        Err(error) => Err(error),
    };
    engine.shutdown();

    match outcome? {
        ForceSyncOutcome::Pulled(snapshot) => {
            println!("Pulled {} records from the room", snapshot.len());
        }
        ForceSyncOutcome::Pushed { .. } => {
            println!("Pushed local data to the room");
        }
        ForceSyncOutcome::Merged(snapshot) => {
            println!("Merged local data with the room ({} records)", snapshot.len());
        }
    }

    Ok(())
}
