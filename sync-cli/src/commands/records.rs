//! Local record editing: add, resolve and list.
//!
//! Edits are saved locally first. If the device is in a room the edit is
//! then synced; a failed sync leaves the edit saved for next time.

use anyhow::Result;
use serde_json::Value;
use stellar_sync_client::unix_millis;
use stellar_sync_types::{Record, RecordKind};
use tracing::warn;
use uuid::Uuid;

use super::{connect, short_id, Workspace};

/// Add a record of `kind` with the given text.
pub async fn add(ws: &Workspace, kind: RecordKind, text: &str) -> Result<()> {
    ws.require_initialized()?;
    let record = Record::new(Uuid::new_v4().to_string())
        .with_created_at(unix_millis())
        .with_field("text", text);
    let id = short_id(&record).to_string();
    ws.collections()
        .update(|s| s.records_mut(kind).push(record))?;

    println!("Added {} {}", kind, id);
    sync_after_edit(ws).await
}

/// Mark a record completed (or failed). `id` may be any unique prefix.
pub async fn resolve(ws: &Workspace, kind: RecordKind, id: &str, failed: bool) -> Result<()> {
    ws.require_initialized()?;
    let collections = ws.collections();
    let index = find(collections.load()?.records(kind), kind, id)?;

    let status = if failed { "failed" } else { "completed" };
    let resolved = collections.update(|s| {
        let record = &mut s.records_mut(kind)[index];
        record.resolved_at = Some(unix_millis());
        record.fields.insert("status".into(), Value::from(status));
        short_id(record).to_string()
    })?;

    println!("Marked {} {} {}", kind, resolved, status);
    sync_after_edit(ws).await
}

/// Print local records, optionally of one kind only.
pub fn list(ws: &Workspace, kind: Option<RecordKind>) -> Result<()> {
    let snapshot = ws.collections().load()?;
    let kinds: Vec<RecordKind> = match kind {
        Some(kind) => vec![kind],
        None => RecordKind::ALL.to_vec(),
    };

    for kind in kinds {
        let records = snapshot.records(kind);
        println!("{} ({})", kind, records.len());
        for record in records {
            let mark = if record.resolved_at.is_some() { "x" } else { " " };
            let text = record.field("text").and_then(Value::as_str).unwrap_or("");
            println!("  {}  [{}] {}", short_id(record), mark, text);
        }
    }

    Ok(())
}

fn find(records: &[Record], kind: RecordKind, prefix: &str) -> Result<usize> {
    let matches: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id.starts_with(prefix))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [index] => Ok(*index),
        [] => anyhow::bail!("No {} with id {}", kind, prefix),
        _ => anyhow::bail!("Id {} matches {} {}; use more characters", prefix, matches.len(), kind),
    }
}

async fn sync_after_edit(ws: &Workspace) -> Result<()> {
    let engine = ws.engine()?;
    match connect(&engine).await {
        Ok(true) => {
            if let Some(code) = engine.current_room_code() {
                println!("Synced with room {}", code);
            }
        }
        Ok(false) => {}
        Err(error) => {
            warn!("sync after edit failed: {:#}", error);
            println!("Saved locally; sync will retry on the next run.");
        }
    }
    engine.shutdown();
    Ok(())
}
