//! Initialize device identity.

use anyhow::{Context, Result};

use super::Workspace;
use crate::config::{CONFIG_FILE, DEFAULT_CONFIG};

/// Run the init command.
pub async fn run(ws: &Workspace) -> Result<()> {
    if ws.is_initialized()? {
        anyhow::bail!(
            "Device already initialized. Delete {} to reinitialize.",
            ws.data_dir().join("store").display()
        );
    }

    let config_path = ws.data_dir().join(CONFIG_FILE);
    if !config_path.exists() {
        tokio::fs::write(&config_path, DEFAULT_CONFIG)
            .await
            .context("Failed to write default configuration")?;
    }

    let device_id = ws.sessions().get_or_create_device_id()?;

    println!("Device initialized successfully!");
    println!();
    println!("  Device ID:  {}", device_id);
    println!("  Data dir:   {}", ws.data_dir().display());
    println!("  Rooms dir:  {}", ws.remote_dir().display());
    println!();
    println!("Next steps:");
    println!("  1. Create a room: stellar-sync pair --create");
    println!("  2. Or join one:   stellar-sync pair --join <code>");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_creates_session_and_config() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(dir.path(), None).unwrap();

        run(&ws).await.unwrap();

        assert!(ws.is_initialized().unwrap());
        assert!(dir.path().join(CONFIG_FILE).exists());
        let session = ws.sessions().load().unwrap();
        assert!(!session.enabled);
        assert!(session.room_code.is_none());
    }

    #[tokio::test]
    async fn init_keeps_existing_config() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[sync]\ndebounce_ms = 10\n").unwrap();
        let ws = Workspace::open(dir.path(), None).unwrap();

        run(&ws).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(contents, "[sync]\ndebounce_ms = 10\n");
    }

    #[tokio::test]
    async fn init_fails_if_already_initialized() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(dir.path(), None).unwrap();

        run(&ws).await.unwrap();
        let device = ws.sessions().load().unwrap().device_id;

        assert!(run(&ws).await.is_err());
        assert_eq!(ws.sessions().load().unwrap().device_id, device);
    }
}
