//! CLI command implementations.

pub mod disconnect;
pub mod init;
pub mod pair;
pub mod pull;
pub mod push;
pub mod records;
pub mod status;
pub mod sync;
pub mod watch;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stellar_sync_client::store::SESSION_KEY;
use stellar_sync_client::{
    FileStore, LocalStore, SessionStore, StoredCollections, SyncError, SyncOrchestrator,
};
use stellar_sync_types::Record;

use crate::config::CliConfig;
use crate::remote::DirRemote;

/// Local store shared by the session and the collections.
pub type Store = Arc<FileStore>;

/// The engine as the CLI runs it.
pub type Engine = SyncOrchestrator<DirRemote, Store, StoredCollections<Store>>;

/// Everything a command needs: data directory, config and stores.
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: PathBuf,
    config: CliConfig,
    remote_dir: PathBuf,
    store: Store,
}

impl Workspace {
    /// Open the data directory, loading its config.
    ///
    /// `remote_dir` overrides the configured room directory.
    pub fn open(data_dir: &Path, remote_dir: Option<&Path>) -> Result<Self> {
        let config = CliConfig::load(data_dir)?;
        let remote_dir = remote_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.remote_dir(data_dir));
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            store: Arc::new(FileStore::new(data_dir.join("store"))),
            remote_dir,
            config,
        })
    }

    /// The data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The shared room directory.
    pub fn remote_dir(&self) -> &Path {
        &self.remote_dir
    }

    /// Whether `init` has run here.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.store.get(SESSION_KEY)?.is_some())
    }

    /// Fail with a hint unless `init` has run.
    pub fn require_initialized(&self) -> Result<()> {
        if !self.is_initialized()? {
            anyhow::bail!("Device not initialized. Run 'stellar-sync init' first.");
        }
        Ok(())
    }

    /// Persisted session.
    pub fn sessions(&self) -> SessionStore<Store> {
        SessionStore::new(self.store.clone())
    }

    /// Persisted collections.
    pub fn collections(&self) -> StoredCollections<Store> {
        StoredCollections::new(self.store.clone())
    }

    /// Remote store over the room directory.
    pub fn remote(&self) -> DirRemote {
        DirRemote::new(&self.remote_dir, self.config.poll_interval())
    }

    /// Build the sync engine.
    pub fn engine(&self) -> Result<Engine> {
        self.require_initialized()?;
        SyncOrchestrator::new(
            self.remote(),
            self.store.clone(),
            self.collections(),
            self.config.sync_config(),
        )
        .context("Failed to load sync session")
    }
}

/// Connect to the stored room.
///
/// Returns `Ok(false)` when sync is off for this device.
pub async fn connect(engine: &Engine) -> Result<bool> {
    if !engine.is_enabled() || engine.current_room_code().is_none() {
        return Ok(false);
    }
    match engine.enable().await {
        Ok(_) => Ok(true),
        Err(SyncError::NotConfigured) => Ok(false),
        Err(e) => Err(e).context("Failed to reach the room"),
    }
}

/// Short form of a record id for display.
pub fn short_id(record: &Record) -> &str {
    record.id.get(..8).unwrap_or(&record.id)
}

/// Format a millisecond timestamp relative to now.
pub fn format_timestamp(millis: u64) -> String {
    let now = stellar_sync_client::unix_millis();
    let diff = now.saturating_sub(millis) / 1000;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}
