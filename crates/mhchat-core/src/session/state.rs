//! Session state container.

use std::sync::Arc;

use serde::Serialize;

use crate::quick_action::QuickAction;
use crate::session::message::Message;
use crate::session::repository::MessageStore;

/// A read-only copy of the session state handed to the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub composer_text: String,
    pub pending: bool,
    pub suggestions: Vec<QuickAction>,
}

/// Single source of truth for one chat session.
///
/// Holds the message log, the composer text, the in-flight flag and the
/// visible quick actions. Every primitive that changes the message log
/// writes the full resulting log to the [`MessageStore`]; store failures are
/// logged and otherwise ignored so persistence never blocks the chat flow.
pub struct SessionState {
    messages: Vec<Message>,
    composer_text: String,
    pending: bool,
    suggestions: Vec<QuickAction>,
    /// Highest id handed out or loaded; survives resets so ids never repeat.
    last_message_id: Option<i64>,
    store: Arc<dyn MessageStore>,
}

impl SessionState {
    /// Creates the state by loading the persisted log.
    ///
    /// A store error yields an empty log.
    pub fn load(store: Arc<dyn MessageStore>, suggestions: Vec<QuickAction>) -> Self {
        let messages = match store.load() {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("Failed to load persisted messages, starting empty: {}", e);
                Vec::new()
            }
        };
        let last_message_id = messages.iter().map(|m| m.id).max();

        tracing::debug!(count = messages.len(), "Session state loaded");

        Self {
            messages,
            composer_text: String::new(),
            pending: false,
            suggestions,
            last_message_id,
            store,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn composer_text(&self) -> &str {
        &self.composer_text
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn suggestions(&self) -> &[QuickAction] {
        &self.suggestions
    }

    /// Appends a message and persists the log.
    pub fn append_message(&mut self, message: Message) {
        self.last_message_id = Some(match self.last_message_id {
            Some(last) => last.max(message.id),
            None => message.id,
        });
        self.messages.push(message);
        self.persist();
    }

    pub fn set_composer_text(&mut self, text: impl Into<String>) {
        self.composer_text = text.into();
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<QuickAction>) {
        self.suggestions = suggestions;
    }

    /// Replaces the whole log and persists it.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        if let Some(max) = messages.iter().map(|m| m.id).max() {
            self.last_message_id = Some(self.last_message_id.map_or(max, |last| last.max(max)));
        }
        self.messages = messages;
        self.persist();
    }

    /// Removes this session's persisted data.
    pub fn clear_persisted(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear persisted messages: {}", e);
        }
    }

    /// Allocates a message id from the current time in epoch milliseconds.
    ///
    /// If `now_ms` is not past the last id (same millisecond, clock moved
    /// backwards) the id is the last id plus one. When the last id is
    /// `i64::MAX` the allocator restarts from `now_ms`.
    pub fn next_message_id(&mut self, now_ms: i64) -> i64 {
        let id = match self.last_message_id {
            Some(last) if now_ms <= last => last.checked_add(1).unwrap_or_else(|| {
                tracing::warn!(last, "Message id space exhausted, restarting from the clock");
                now_ms
            }),
            _ => now_ms,
        };
        self.last_message_id = Some(id);
        id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            composer_text: self.composer_text.clone(),
            pending: self.pending,
            suggestions: self.suggestions.clone(),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.messages) {
            tracing::warn!("Failed to persist {} messages: {}", self.messages.len(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MhChatError, Result};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        initial: Vec<Message>,
        saves: Mutex<Vec<Vec<Message>>>,
        clears: Mutex<usize>,
        fail: bool,
    }

    impl MessageStore for RecordingStore {
        fn load(&self) -> Result<Vec<Message>> {
            if self.fail {
                return Err(MhChatError::storage("disk on fire"));
            }
            Ok(self.initial.clone())
        }

        fn save(&self, messages: &[Message]) -> Result<()> {
            if self.fail {
                return Err(MhChatError::storage("disk on fire"));
            }
            self.saves.lock().unwrap().push(messages.to_vec());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            *self.clears.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn user(id: i64, text: &str) -> Message {
        Message::user(id, text, "12:00:00 PM")
    }

    #[test]
    fn test_load_restores_messages() {
        let store = Arc::new(RecordingStore {
            initial: vec![user(10, "a"), user(20, "b")],
            ..Default::default()
        });
        let mut state = SessionState::load(store, Vec::new());

        assert_eq!(state.messages().len(), 2);
        assert!(!state.is_pending());
        assert_eq!(state.composer_text(), "");
        // Loaded ids seed the allocator.
        assert_eq!(state.next_message_id(5), 21);
    }

    #[test]
    fn test_load_failure_starts_empty() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let state = SessionState::load(store, Vec::new());
        assert!(state.messages().is_empty());
    }

    #[test]
    fn test_append_saves_full_log() {
        let store = Arc::new(RecordingStore::default());
        let mut state = SessionState::load(store.clone(), Vec::new());

        state.append_message(user(1, "a"));
        state.append_message(user(2, "b"));

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[1], state.messages().to_vec());
    }

    #[test]
    fn test_composer_and_pending_do_not_persist() {
        let store = Arc::new(RecordingStore::default());
        let mut state = SessionState::load(store.clone(), Vec::new());

        state.set_composer_text("draft");
        state.set_pending(true);
        state.set_suggestions(vec![QuickAction::new("/calc ", "Calculator")]);

        assert!(store.saves.lock().unwrap().is_empty());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.composer_text, "draft");
        assert!(snapshot.pending);
        assert_eq!(snapshot.suggestions.len(), 1);
    }

    #[test]
    fn test_replace_all_and_clear() {
        let store = Arc::new(RecordingStore::default());
        let mut state = SessionState::load(store.clone(), Vec::new());
        state.append_message(user(1, "a"));

        state.replace_all(Vec::new());
        state.clear_persisted();

        assert!(state.messages().is_empty());
        assert_eq!(store.saves.lock().unwrap().last().unwrap().len(), 0);
        assert_eq!(*store.clears.lock().unwrap(), 1);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let mut state = SessionState::load(store, Vec::new());
        state.append_message(user(1, "still here"));
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_ids_stay_increasing_when_clock_stalls() {
        let store = Arc::new(RecordingStore::default());
        let mut state = SessionState::load(store, Vec::new());

        let a = state.next_message_id(1_000);
        let b = state.next_message_id(1_000);
        let c = state.next_message_id(999);
        let d = state.next_message_id(5_000);

        assert_eq!((a, b, c, d), (1_000, 1_001, 1_002, 5_000));
    }

    #[test]
    fn test_ids_do_not_repeat_after_reset() {
        let store = Arc::new(RecordingStore::default());
        let mut state = SessionState::load(store, Vec::new());
        let first = state.next_message_id(1_000);
        state.append_message(user(first, "a"));

        state.replace_all(Vec::new());

        assert_eq!(state.next_message_id(1_000), 1_001);
    }

    #[test]
    fn test_exhausted_ids_restart_from_clock() {
        let store = Arc::new(RecordingStore::default());
        let mut state = SessionState::load(store, Vec::new());
        state.append_message(user(i64::MAX, "from a broken clock"));

        let a = state.next_message_id(1_000);
        let b = state.next_message_id(1_000);

        assert_eq!((a, b), (1_000, 1_001));
    }
}
