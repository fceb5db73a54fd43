//! Outbound integration with the remote chat service.

pub mod http_chat_client;

pub use http_chat_client::HttpChatClient;
