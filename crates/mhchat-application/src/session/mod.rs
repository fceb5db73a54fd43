//! Chat session orchestration.

mod chat_session;

pub use chat_session::{
    ChatSession, CompletedRequest, PendingRequest, RejectReason, SendOutcome, SendStart,
    SessionSettings,
};
