//! Core domain of the mhchat client.
//!
//! Holds the message model, the session state container, command and
//! quick-action interpretation, configuration, and the traits at the two
//! external seams: message persistence and the chat transport.

pub mod chat;
pub mod command;
pub mod config;
pub mod error;
pub mod quick_action;
pub mod session;

// Re-export common error type
pub use error::MhChatError;
