//! Chat transport trait.

use async_trait::async_trait;

use super::failure::RequestFailure;
use super::request::{ChatReply, ChatRequest};

/// Sends a single chat turn to the remote service.
///
/// Implementations map every way a call can go wrong onto a
/// [`RequestFailure`]; they never panic on bad responses.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issues one request and waits for the reply.
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RequestFailure>;
}
