//! # stellar-sync
//!
//! Command-line host for the stellar-sync engine.
//!
//! Keeps tasks, routines and notes in a local data directory and syncs them
//! through a room in a shared rooms directory. Two data directories that
//! point at the same rooms directory behave like two devices.
//!
//! ## Commands
//!
//! - `init`: Initialize device identity
//! - `pair`: Create or join a room
//! - `add` / `resolve` / `list`: Edit and show local records
//! - `push` / `pull` / `sync`: Exchange data with the room
//! - `watch`: Stay connected and apply remote changes as they arrive
//! - `status`: Show device, room and local data
//! - `disconnect`: Leave the room
//!
//! ## Example
//!
//! ```bash
//! # Device A
//! stellar-sync --data-dir a --remote-dir shared init
//! stellar-sync --data-dir a --remote-dir shared add todo "Run 5k"
//! stellar-sync --data-dir a --remote-dir shared pair --create
//!
//! # Device B
//! stellar-sync --data-dir b --remote-dir shared init
//! stellar-sync --data-dir b --remote-dir shared pair --join STAR-7X9K
//! stellar-sync --data-dir b --remote-dir shared list
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use stellar_sync_types::RecordKind;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod remote;

use commands::{disconnect, init, pair, pull, push, records, status, sync, watch, Workspace};

/// Offline-first sync for tasks, routines and notes.
#[derive(Parser, Debug)]
#[command(name = "stellar-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the device identity, session and local records
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Shared rooms directory (overrides `[remote] dir` in the config)
    #[arg(long, global = true)]
    remote_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize device identity
    Init,

    /// Create or join a room
    Pair {
        /// Create a room from local data (generates a code unless --code is given)
        #[arg(long, conflicts_with = "join")]
        create: bool,

        /// Room code to create
        #[arg(long, requires = "create")]
        code: Option<String>,

        /// Join an existing room
        #[arg(long, conflicts_with = "create")]
        join: Option<String>,
    },

    /// Add a record
    Add {
        /// Collection: todo, routine or note
        kind: RecordKind,

        /// Record text
        text: String,
    },

    /// Mark a record completed
    Resolve {
        /// Collection: todo, routine or note
        kind: RecordKind,

        /// Record id (any unique prefix)
        id: String,

        /// Mark as failed instead of completed
        #[arg(long)]
        failed: bool,
    },

    /// List local records
    List {
        /// Only this collection
        kind: Option<RecordKind>,
    },

    /// Push local data to the room
    Push,

    /// Replace local data with the room's
    Pull {
        /// Only show what the room holds
        #[arg(long)]
        dry_run: bool,
    },

    /// Reconcile local data with the room
    Sync,

    /// Stay connected and print sync activity
    Watch {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Show sync status
    Status,

    /// Leave the current room (local data is kept)
    Disconnect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let ws = Workspace::open(&data_dir, cli.remote_dir.as_deref())?;

    match cli.command {
        Commands::Init => init::run(&ws).await?,
        Commands::Pair { create, code, join } => {
            if create {
                pair::create(&ws, code.as_deref()).await?;
            } else if let Some(code) = join {
                pair::join(&ws, &code).await?;
            } else {
                anyhow::bail!("Must specify either --create or --join");
            }
        }
        Commands::Add { kind, text } => records::add(&ws, kind, &text).await?,
        Commands::Resolve { kind, id, failed } => {
            records::resolve(&ws, kind, &id, failed).await?
        }
        Commands::List { kind } => records::list(&ws, kind)?,
        Commands::Push => push::run(&ws).await?,
        Commands::Pull { dry_run } => pull::run(&ws, dry_run).await?,
        Commands::Sync => sync::run(&ws).await?,
        Commands::Watch { seconds } => {
            watch::run(&ws, seconds.map(Duration::from_secs)).await?
        }
        Commands::Status => status::run(&ws).await?,
        Commands::Disconnect => disconnect::run(&ws).await?,
    }

    Ok(())
}

/// Get the default data directory for stellar-sync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("app", "stellar", "stellar-sync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
