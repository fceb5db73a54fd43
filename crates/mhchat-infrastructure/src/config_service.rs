//! Configuration service implementation.
//!
//! Loads the client configuration from `~/.config/mhchat/config.toml`,
//! creating the file with defaults on first run.

use std::path::{Path, PathBuf};

use mhchat_core::MhChatError;
use mhchat_core::config::ChatConfig;
use mhchat_core::error::Result;

use crate::paths::MhChatPaths;
use crate::storage::{AtomicFile, FileFormat};

/// Reads `config.toml` into a [`ChatConfig`].
pub struct ConfigService {
    file: AtomicFile<ChatConfig>,
}

impl ConfigService {
    /// Creates a service for the default config path.
    pub fn new_default() -> Result<Self> {
        Ok(Self::with_path(MhChatPaths::config_file()?))
    }

    /// Creates a service for an explicit config path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path, FileFormat::Toml),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the configuration.
    ///
    /// A missing file yields the defaults, which are written back so the user
    /// has a template to edit; failing to write it is only logged. A file
    /// that exists but does not parse is an error.
    pub fn load_or_create(&self) -> Result<ChatConfig> {
        match self.file.load() {
            Ok(Some(config)) => {
                tracing::debug!("Loaded config from {:?}", self.file.path());
                Ok(config)
            }
            Ok(None) => {
                let config = ChatConfig::default();
                if let Err(e) = self.file.save(&config) {
                    tracing::warn!(
                        "Could not write default config to {:?}: {}",
                        self.file.path(),
                        e
                    );
                }
                Ok(config)
            }
            Err(e) => Err(MhChatError::config(format!(
                "Invalid config file {:?}: {}",
                self.file.path(),
                e
            ))),
        }
    }
}
