//! Message store trait.

use crate::error::Result;
use crate::session::message::Message;

/// Durable storage of one session's message log.
///
/// The store mirrors the in-memory log: callers save the full log after
/// every change and never read back mid-session. Calls are synchronous so
/// a save has completed by the time the caller continues.
pub trait MessageStore: Send + Sync {
    /// Loads the persisted log.
    ///
    /// Returns an empty log when nothing was saved yet. Implementations
    /// should also return an empty log for data that is not a valid message
    /// array; `Err` is reserved for the store being unreachable.
    fn load(&self) -> Result<Vec<Message>>;

    /// Overwrites the persisted log with `messages`.
    fn save(&self, messages: &[Message]) -> Result<()>;

    /// Removes all persisted data for this session.
    fn clear(&self) -> Result<()>;
}
