//! File-backed message store.
//!
//! Stores the message log as a JSON array in
//! `{data_dir}/{namespace}.json`, replaced atomically on every save.

use std::path::Path;

use mhchat_core::error::Result;
use mhchat_core::session::{Message, MessageStore};

use crate::paths::MhChatPaths;
use crate::storage::{AtomicFile, FileFormat};

/// Durable [`MessageStore`] keyed by a namespace file under the data dir.
pub struct FileMessageStore {
    file: AtomicFile<Vec<Message>>,
}

impl FileMessageStore {
    pub fn new(data_dir: &Path, namespace: &str) -> Self {
        Self {
            file: AtomicFile::new(
                MhChatPaths::message_log_file(data_dir, namespace),
                FileFormat::Json,
            ),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl MessageStore for FileMessageStore {
    fn load(&self) -> Result<Vec<Message>> {
        match self.file.load() {
            Ok(Some(messages)) => Ok(messages),
            Ok(None) => Ok(Vec::new()),
            Err(e) if e.is_parse_error() => {
                tracing::warn!(
                    "Ignoring unreadable message log at {:?}: {}",
                    self.file.path(),
                    e
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        self.file.save(&messages.to_vec())?;
        tracing::debug!(count = messages.len(), "Message log saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("Message log cleared");
        Ok(())
    }
}
