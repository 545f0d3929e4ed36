//! Configuration for stellar-sync.
//!
//! Configuration is loaded from `stellar-sync.toml` in the data directory.
//! Every field is optional; a missing file means all defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use stellar_sync_client::SyncConfig;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "stellar-sync.toml";

/// Written by `init` so the available settings are discoverable.
pub const DEFAULT_CONFIG: &str = r#"# stellar-sync configuration

[sync]
# Quiet period after a local edit before it is pushed.
debounce_ms = 800
# Timestamps closer than this are merged instead of overwritten.
merge_window_ms = 5000
# Refuse to create a room whose code is already taken.
reject_existing_rooms = false

[remote]
# Shared directory holding room documents. Relative paths are resolved
# against the data directory.
# dir = "../remote"
# How often `watch` checks the room for changes.
poll_interval_ms = 500
"#;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Engine tuning.
    #[serde(default)]
    pub sync: SyncSection,
    /// Where rooms live.
    #[serde(default)]
    pub remote: RemoteSection,
}

/// `[sync]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    /// Debounce window in milliseconds (default: 800).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Merge window in milliseconds (default: 5000).
    #[serde(default = "default_merge_window_ms")]
    pub merge_window_ms: u64,
    /// Reject `pair --create` for an existing code (default: false).
    #[serde(default)]
    pub reject_existing_rooms: bool,
}

/// `[remote]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    /// Room directory (default: `remote` inside the data directory).
    pub dir: Option<PathBuf>,
    /// Watch poll interval in milliseconds (default: 500).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_debounce_ms() -> u64 {
    800
}

fn default_merge_window_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            merge_window_ms: default_merge_window_ms(),
            reject_existing_rooms: false,
        }
    }
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            dir: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `stellar-sync.toml` from `data_dir`, or defaults if it is absent.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Engine settings.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default()
            .with_debounce(Duration::from_millis(self.sync.debounce_ms))
            .with_merge_window(Duration::from_millis(self.sync.merge_window_ms))
            .with_reject_existing_rooms(self.sync.reject_existing_rooms)
    }

    /// Room directory, resolved against `data_dir`.
    pub fn remote_dir(&self, data_dir: &Path) -> PathBuf {
        match &self.remote.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => data_dir.join(dir),
            None => data_dir.join("remote"),
        }
    }

    /// Watch poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.remote.poll_interval_ms.max(10))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = CliConfig::load(dir.path()).unwrap();

        assert_eq!(config.sync.debounce_ms, 800);
        assert_eq!(config.sync.merge_window_ms, 5000);
        assert!(!config.sync.reject_existing_rooms);
        assert_eq!(config.remote_dir(dir.path()), dir.path().join("remote"));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let config: CliConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.sync.debounce_ms, 800);
        assert_eq!(config.remote.poll_interval_ms, 500);
        assert!(config.remote.dir.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[sync]\ndebounce_ms = 50\n\n[remote]\ndir = \"../shared\"\n",
        )
        .unwrap();

        let config = CliConfig::load(dir.path()).unwrap();

        assert_eq!(config.sync.debounce_ms, 50);
        assert_eq!(config.sync.merge_window_ms, 5000);
        assert_eq!(
            config.remote_dir(dir.path()),
            dir.path().join("../shared")
        );
        let sync = config.sync_config();
        assert_eq!(sync.debounce, Duration::from_millis(50));
        assert_eq!(sync.merge_window, Duration::from_millis(5000));
    }

    #[test]
    fn absolute_remote_dir_is_kept() {
        let data = tempdir().unwrap();
        let shared = tempdir().unwrap();
        let config = CliConfig {
            remote: RemoteSection {
                dir: Some(shared.path().to_path_buf()),
                ..RemoteSection::default()
            },
            ..CliConfig::default()
        };

        assert_eq!(config.remote_dir(data.path()), shared.path());
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[sync\n").unwrap();

        let err = CliConfig::load(dir.path()).unwrap_err();

        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
