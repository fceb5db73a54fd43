//! Session domain: messages, state container and the persistence seam.

mod message;
mod repository;
mod state;

pub use message::{FALLBACK_REPLY_TEXT, Message, MessageMeta, MessageRole};
pub use repository::MessageStore;
pub use state::{SessionSnapshot, SessionState};
