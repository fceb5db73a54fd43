//! Path resolution for mhchat configuration, data and logs.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/mhchat/            # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/mhchat/       # Data directory (or `data_dir` override)
//! ├── mh-chat-messages.json    # Persisted message log, one file per namespace
//! └── logs/
//!     └── mhchat.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for mhchat_core::MhChatError {
    fn from(e: PathError) -> Self {
        mhchat_core::MhChatError::config(e.to_string())
    }
}

/// Unified path management for mhchat.
pub struct MhChatPaths;

impl MhChatPaths {
    const APP_DIR: &'static str = "mhchat";
    const CONFIG_FILE: &'static str = "config.toml";
    const LOGS_DIR: &'static str = "logs";

    /// Returns the mhchat configuration directory (e.g. `~/.config/mhchat/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(Self::CONFIG_FILE))
    }

    /// Returns the data directory, honoring an explicit override.
    pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }

        dirs::data_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the log directory under a data directory.
    pub fn logs_dir(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::LOGS_DIR)
    }

    /// Returns the message log file for a storage namespace.
    pub fn message_log_file(data_dir: &Path, namespace: &str) -> PathBuf {
        data_dir.join(format!("{namespace}.json"))
    }
}
