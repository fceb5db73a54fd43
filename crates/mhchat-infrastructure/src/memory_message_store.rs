//! In-memory message store.
//!
//! Used by `--ephemeral` runs and by tests that do not need a file system.

use std::sync::Mutex;

use mhchat_core::MhChatError;
use mhchat_core::error::Result;
use mhchat_core::session::{Message, MessageStore};

/// Process-local [`MessageStore`]; contents are lost when it is dropped.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<Option<Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `messages`.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(Some(messages)),
        }
    }

    /// Whether anything is currently stored (`clear` resets this).
    pub fn has_data(&self) -> bool {
        self.messages.lock().map(|m| m.is_some()).unwrap_or(false)
    }
}

impl MessageStore for InMemoryMessageStore {
    fn load(&self) -> Result<Vec<Message>> {
        let guard = self
            .messages
            .lock()
            .map_err(|e| MhChatError::storage(format!("Message store lock poisoned: {}", e)))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        let mut guard = self
            .messages
            .lock()
            .map_err(|e| MhChatError::storage(format!("Message store lock poisoned: {}", e)))?;
        *guard = Some(messages.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .messages
            .lock()
            .map_err(|e| MhChatError::storage(format!("Message store lock poisoned: {}", e)))?;
        *guard = None;
        Ok(())
    }
}
