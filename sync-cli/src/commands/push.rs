//! Push local data to the room.

use anyhow::{Context, Result};
use stellar_sync_client::{PushOutcome, SyncHost};

use super::{connect, Workspace};

/// Run the push command.
///
/// Connecting reads the room first, so a device with stale data pulls or
/// merges before anything is written.
pub async fn run(ws: &Workspace) -> Result<()> {
    let engine = ws.engine()?;
    if !connect(&engine).await? {
        anyhow::bail!("Not in a room. Run 'stellar-sync pair' first.");
    }

    let records = engine.host().snapshot()?.len();
    let outcome = engine.push_changes().await;
    engine.shutdown();

    match outcome.context("Push failed")? {
        PushOutcome::Pushed { .. } => {
            println!("Pushed {} records", records);
        }
        PushOutcome::Skipped(reason) => {
            println!("Push skipped: {}", reason);
        }
    }

    Ok(())
}
