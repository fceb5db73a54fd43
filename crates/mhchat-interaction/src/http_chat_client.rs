//! HttpChatClient - REST implementation of the chat transport.
//!
//! Posts `{session_id, message}` to the configured endpoint and maps the
//! response onto a [`ChatReply`] or a categorized [`RequestFailure`].

use async_trait::async_trait;
use mhchat_core::MhChatError;
use mhchat_core::chat::{ChatReply, ChatRequest, ChatTransport, RequestFailure};
use reqwest::{Client, Url};

const USER_AGENT: &str = concat!("mhchat/", env!("CARGO_PKG_VERSION"));

/// [`ChatTransport`] that talks to the chat API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: Url,
}

impl HttpChatClient {
    /// Creates a client for `endpoint`.
    ///
    /// Fails if the endpoint is not a valid URL or the HTTP client cannot be
    /// built (e.g. TLS backend initialization).
    pub fn new(endpoint: &str) -> Result<Self, MhChatError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MhChatError::internal(format!("Failed to build HTTP client: {e}")))?;

        Self::with_client(client, endpoint)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self, MhChatError> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| MhChatError::config(format!("Invalid chat endpoint '{endpoint}': {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RequestFailure> {
        tracing::debug!(endpoint = %self.endpoint, "Posting chat message");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| RequestFailure::Transport(err.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let failure =
                RequestFailure::from_status(status.as_u16(), status.canonical_reason(), &body);
            tracing::warn!(status = status.as_u16(), "Chat API returned an error: {}", failure);
            return Err(failure);
        }

        let body = response
            .text()
            .await
            .map_err(|err| RequestFailure::Transport(format!("failed to read response body: {err}")))?;

        serde_json::from_str::<ChatReply>(&body)
            .map_err(|err| RequestFailure::MalformedResponse(err.to_string()))
    }
}
