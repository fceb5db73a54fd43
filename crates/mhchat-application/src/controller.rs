//! ChatController - drives a [`ChatSession`] from view events.
//!
//! All state changes happen on one task. A dispatched request runs on its own
//! Tokio task so the composer keeps accepting edits while the reply is
//! outstanding; the reply is applied back on the controller task. Every
//! change is published as a [`SessionSnapshot`] on a watch channel.

use mhchat_core::chat::RequestFailure;
use mhchat_core::session::SessionSnapshot;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::session::{ChatSession, CompletedRequest, SendOutcome, SendStart};

/// A key the view forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other(String),
}

/// Modifier state for a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// Input from the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The composer now holds this text.
    TextChanged(String),
    /// The send button was pressed.
    SendClicked,
    KeyPressed { key: Key, modifiers: Modifiers },
    /// A quick action chip was clicked; carries its command.
    QuickActionClicked(String),
    /// The reset button was pressed.
    ResetClicked,
}

pub struct ChatController {
    session: ChatSession,
    snapshots: watch::Sender<SessionSnapshot>,
    in_flight: Option<JoinHandle<CompletedRequest>>,
}

impl ChatController {
    /// Wraps `session` and returns a receiver for its snapshots.
    pub fn new(session: ChatSession) -> (Self, watch::Receiver<SessionSnapshot>) {
        let (snapshots, rx) = watch::channel(session.snapshot());
        let controller = Self {
            session,
            snapshots,
            in_flight: None,
        };
        (controller, rx)
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Whether a request task is outstanding.
    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Applies one view event.
    ///
    /// Must be called within a Tokio runtime: a send spawns the request.
    pub fn handle_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::TextChanged(text) => self.session.set_composer_text(text),
            ViewEvent::SendClicked => self.dispatch_send(),
            ViewEvent::KeyPressed {
                key: Key::Enter,
                modifiers,
            } => {
                if modifiers.shift {
                    let mut text = self.session.composer_text().to_string();
                    text.push('\n');
                    self.session.set_composer_text(text);
                } else {
                    self.dispatch_send();
                }
            }
            ViewEvent::KeyPressed { .. } => return,
            ViewEvent::QuickActionClicked(command) => self.session.click_quick_action(&command),
            ViewEvent::ResetClicked => self.session.reset(),
        }

        self.publish();
    }

    /// Waits for the outstanding request, if any, and applies its result.
    pub async fn wait_for_reply(&mut self) -> Option<SendOutcome> {
        let handle = self.in_flight.take()?;
        let joined = handle.await;
        Some(self.complete(joined))
    }

    /// Runs until `events` closes, then lets any outstanding request finish.
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run(mut self, mut events: mpsc::Receiver<ViewEvent>) -> ChatSession {
        tracing::debug!("Chat controller started");

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                joined = join_in_flight(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.complete(joined);
                }
            }
        }

        if self.wait_for_reply().await.is_some() {
            tracing::debug!("Applied reply received after the view closed");
        }

        tracing::debug!("Chat controller stopped");
        self.session
    }

    fn dispatch_send(&mut self) {
        let text = self.session.composer_text().to_string();

        match self.session.begin_send(&text) {
            SendStart::Dispatched(pending) => {
                self.in_flight = Some(tokio::spawn(pending.execute()));
            }
            SendStart::Reset | SendStart::Rejected(_) => {}
        }
    }

    fn complete(&mut self, joined: Result<CompletedRequest, JoinError>) -> SendOutcome {
        self.in_flight = None;

        let completed = joined.unwrap_or_else(|err| {
            tracing::error!("Chat request task failed: {}", err);
            CompletedRequest::failed(RequestFailure::Transport(format!(
                "request task failed: {err}"
            )))
        });

        let outcome = self.session.finish_send(completed);
        self.publish();
        outcome
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}

async fn join_in_flight(
    in_flight: &mut Option<JoinHandle<CompletedRequest>>,
) -> Result<CompletedRequest, JoinError> {
    match in_flight {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
