//! Request orchestration and reset for one conversation.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use mhchat_core::chat::{ChatReply, ChatRequest, ChatTransport, FailureKind, RequestFailure};
use mhchat_core::command::{self, Command};
use mhchat_core::config::{ChatConfig, DEFAULT_TIME_FORMAT};
use mhchat_core::quick_action::{QuickAction, QuickActionRegistry};
use mhchat_core::session::{Message, MessageStore, SessionSnapshot, SessionState};

use crate::clock::{Clock, SystemClock};

/// Per-session settings taken from [`ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Caller identity sent with every request.
    pub session_id: String,
    /// Upper bound on one request; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// strftime pattern for message timestamps.
    pub time_format: String,
}

impl SessionSettings {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            session_id: config.session_id.clone(),
            request_timeout: config.request_timeout(),
            time_format: config.time_format.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Why a send attempt was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing but whitespace to send.
    Empty,
    /// Another request is still in flight.
    Pending,
}

/// Result of the synchronous half of a send.
pub enum SendStart {
    /// Nothing changed and no request was issued.
    Rejected(RejectReason),
    /// The input was `/reset`; the conversation was cleared.
    Reset,
    /// The user message was appended; the request must be executed and
    /// handed back to [`ChatSession::finish_send`].
    Dispatched(PendingRequest),
}

/// Final result of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Rejected(RejectReason),
    Reset,
    /// A bot reply was appended.
    Replied,
    /// The fallback bot message was appended.
    Failed(FailureKind),
}

/// A request that has been recorded in the session but not yet sent.
///
/// Owns everything it needs so it can run on another task while the session
/// keeps handling composer edits.
pub struct PendingRequest {
    request: ChatRequest,
    transport: Arc<dyn ChatTransport>,
    timeout: Option<Duration>,
}

impl PendingRequest {
    /// Sends the request, bounded by the session timeout.
    pub async fn execute(self) -> CompletedRequest {
        let call = self.transport.send(&self.request);

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RequestFailure::Timeout {
                    after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }),
            },
            None => call.await,
        };

        CompletedRequest { outcome }
    }
}

/// The outcome of a [`PendingRequest`], to be applied to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRequest {
    outcome: Result<ChatReply, RequestFailure>,
}

impl CompletedRequest {
    /// A request that ended without running to completion (e.g. its task
    /// was aborted).
    pub fn failed(failure: RequestFailure) -> Self {
        Self {
            outcome: Err(failure),
        }
    }
}

/// One conversation: state, quick actions and the chat transport.
///
/// Implements the send state machine (`Idle -> Sending -> Idle`) and the
/// reset controller. Failures of the chat API never escape; they become bot
/// messages in the log.
pub struct ChatSession {
    state: SessionState,
    registry: QuickActionRegistry,
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
}

impl ChatSession {
    /// Loads the persisted log and starts idle with an empty composer.
    pub fn new(
        store: Arc<dyn MessageStore>,
        transport: Arc<dyn ChatTransport>,
        settings: SessionSettings,
    ) -> Self {
        let registry = QuickActionRegistry::default();
        let state = SessionState::load(store, registry.suggestions_for(""));

        Self {
            state,
            registry,
            transport,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn composer_text(&self) -> &str {
        self.state.composer_text()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn suggestions(&self) -> &[QuickAction] {
        self.state.suggestions()
    }

    pub fn registry(&self) -> &QuickActionRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// Updates the composer and recomputes the visible quick actions.
    ///
    /// Allowed while a request is pending.
    pub fn set_composer_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let suggestions = self.registry.suggestions_for(&text);
        self.state.set_composer_text(text);
        self.state.set_suggestions(suggestions);
    }

    /// A quick action click puts its command in the composer.
    pub fn click_quick_action(&mut self, command: &str) {
        self.set_composer_text(command);
    }

    /// Synchronous half of a send: validation, command handling, and
    /// recording the user message.
    pub fn begin_send(&mut self, text: &str) -> SendStart {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return SendStart::Rejected(RejectReason::Empty);
        }
        if self.state.is_pending() {
            tracing::debug!("Ignoring send while a request is in flight");
            return SendStart::Rejected(RejectReason::Pending);
        }

        if let Some(Command::Reset) = command::parse(trimmed).command {
            self.reset();
            return SendStart::Reset;
        }

        let (id, time) = self.stamp();
        self.state.append_message(Message::user(id, trimmed, time));
        self.set_composer_text(String::new());
        self.state.set_pending(true);

        tracing::info!(message_id = id, "Sending chat message");

        SendStart::Dispatched(PendingRequest {
            request: ChatRequest::new(self.settings.session_id.clone(), trimmed),
            transport: Arc::clone(&self.transport),
            timeout: self.settings.request_timeout,
        })
    }

    /// Applies a finished request: appends exactly one bot message and
    /// returns the session to idle.
    pub fn finish_send(&mut self, completed: CompletedRequest) -> SendOutcome {
        let (id, time) = self.stamp();

        let outcome = match completed.outcome {
            Ok(reply) => {
                tracing::info!(
                    message_id = id,
                    intent = reply.intent.as_deref().unwrap_or("-"),
                    tool = reply.tool.as_deref().unwrap_or("-"),
                    "Chat reply received"
                );
                self.state.append_message(Message::bot_reply(id, reply, time));
                SendOutcome::Replied
            }
            Err(failure) => {
                tracing::warn!(
                    message_id = id,
                    kind = %failure.kind(),
                    "Chat request failed: {}",
                    failure
                );
                self.state
                    .append_message(Message::bot_failure(id, &failure, time));
                SendOutcome::Failed(failure.kind())
            }
        };

        self.state.set_pending(false);
        outcome
    }

    /// Sends `text` and waits for the reply.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        match self.begin_send(text) {
            SendStart::Rejected(reason) => SendOutcome::Rejected(reason),
            SendStart::Reset => SendOutcome::Reset,
            SendStart::Dispatched(pending) => {
                let completed = pending.execute().await;
                self.finish_send(completed)
            }
        }
    }

    /// Sends the current composer text and waits for the reply.
    pub async fn send_composer(&mut self) -> SendOutcome {
        let text = self.state.composer_text().to_string();
        self.send(&text).await
    }

    /// Clears the conversation, the composer and the persisted log.
    ///
    /// A request already in flight is not cancelled; its reply is appended
    /// to the fresh conversation when it arrives.
    pub fn reset(&mut self) {
        self.state.replace_all(Vec::new());
        self.set_composer_text(String::new());
        self.state.clear_persisted();
        tracing::info!("Conversation reset");
    }

    /// Allocates a message id and display timestamp for "now".
    fn stamp(&mut self) -> (i64, String) {
        let now = self.clock.now();
        let id = self.state.next_message_id(now.timestamp_millis());

        let mut time = String::new();
        if write!(time, "{}", now.format(&self.settings.time_format)).is_err() {
            time = now.format(DEFAULT_TIME_FORMAT).to_string();
        }

        (id, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, TimeZone};
    use mhchat_infrastructure::InMemoryMessageStore;

    struct EchoTransport;

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RequestFailure> {
            Ok(ChatReply::new(format!("echo: {}", request.message)))
        }
    }

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn session_with(settings: SessionSettings) -> ChatSession {
        let clock = Local.with_ymd_and_hms(2024, 5, 1, 15, 4, 5).unwrap();
        ChatSession::new(
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(EchoTransport),
            settings,
        )
        .with_clock(Arc::new(FixedClock(clock)))
    }

    #[tokio::test]
    async fn test_timestamp_uses_configured_format() {
        let mut session = session_with(SessionSettings::default());
        session.send("hello").await;

        assert_eq!(session.messages()[0].time, "3:04:05 PM");
    }

    #[tokio::test]
    async fn test_invalid_time_format_falls_back() {
        let settings = SessionSettings {
            time_format: "%H:%".to_string(),
            ..SessionSettings::default()
        };
        let mut session = session_with(settings);
        session.send("hello").await;

        assert_eq!(session.messages()[0].time, "3:04:05 PM");
    }

    #[tokio::test]
    async fn test_same_instant_ids_increment() {
        let mut session = session_with(SessionSettings::default());
        session.send("one").await;
        session.send("two").await;

        let ids: Vec<i64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    #[test]
    fn test_settings_from_config() {
        let config = ChatConfig {
            session_id: "kiosk-7".to_string(),
            request_timeout_secs: 0,
            ..ChatConfig::default()
        };
        let settings = SessionSettings::from_config(&config);
        assert_eq!(settings.session_id, "kiosk-7");
        assert_eq!(settings.request_timeout, None);
    }
}
