//! Hands REPL input to the controller.

use mhchat_application::ViewEvent;
use mhchat_core::session::SessionSnapshot;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

/// What happened to a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// The controller took the line.
    Sent,
    /// A reply is still outstanding; the line was not sent.
    Busy,
    /// The controller has stopped.
    Closed,
}

/// Forwards lines from the blocking readline thread.
///
/// Every call blocks until the controller has handled the send, so the next
/// call always sees the `pending` flag it produced.
pub struct Submitter {
    events: mpsc::Sender<ViewEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    runtime: Handle,
}

impl Submitter {
    pub fn new(
        events: mpsc::Sender<ViewEvent>,
        snapshots: watch::Receiver<SessionSnapshot>,
        runtime: Handle,
    ) -> Self {
        Self {
            events,
            snapshots,
            runtime,
        }
    }

    /// Sends `line` as the composer text, unless a reply is outstanding.
    ///
    /// Must not be called from async context.
    pub fn submit(&mut self, line: &str) -> Submit {
        if self.snapshots.borrow_and_update().pending {
            return Submit::Busy;
        }

        for event in [ViewEvent::TextChanged(line.to_string()), ViewEvent::SendClicked] {
            if self.events.blocking_send(event).is_err() {
                return Submit::Closed;
            }
        }

        // A handled send either clears the composer or leaves it behind a
        // pending request; the intermediate TextChanged snapshot does neither.
        let snapshots = &mut self.snapshots;
        self.runtime.block_on(async {
            loop {
                if snapshots.changed().await.is_err() {
                    return Submit::Closed;
                }
                let snapshot = snapshots.borrow_and_update();
                if snapshot.pending || snapshot.composer_text.is_empty() {
                    return Submit::Sent;
                }
            }
        })
    }

    /// Clears the conversation.
    pub fn reset(&self) -> Submit {
        match self.events.blocking_send(ViewEvent::ResetClicked) {
            Ok(()) => Submit::Sent,
            Err(_) => Submit::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use mhchat_application::{ChatController, ChatSession, SessionSettings};
    use mhchat_core::chat::{ChatReply, ChatRequest, ChatTransport, RequestFailure};
    use mhchat_infrastructure::InMemoryMessageStore;
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;

    /// Holds every request until `release` is called.
    struct GatedTransport {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for GatedTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RequestFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(ChatReply::new(format!("re: {}", request.message)))
        }
    }

    fn start() -> (Submitter, Arc<GatedTransport>, JoinHandle<ChatSession>) {
        let transport = Arc::new(GatedTransport {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let session = ChatSession::new(
            Arc::new(InMemoryMessageStore::new()),
            transport.clone(),
            SessionSettings::default(),
        );
        let (controller, snapshots) = ChatController::new(session);
        let (events, event_rx) = mpsc::channel(32);
        let task = tokio::spawn(controller.run(event_rx));

        (Submitter::new(events, snapshots, Handle::current()), transport, task)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_second_line_is_busy_until_reply() {
        let (mut submitter, transport, task) = start();

        let results = tokio::task::spawn_blocking(move || {
            let first = submitter.submit("hello");
            let second = submitter.submit("again");
            (first, second)
        })
        .await
        .unwrap();

        assert_eq!(results, (Submit::Sent, Submit::Busy));

        transport.gate.notify_one();
        let session = task.await.unwrap();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        let texts: Vec<&str> = session.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "re: hello"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reset_command_is_acknowledged() {
        let (mut submitter, transport, task) = start();

        let result = tokio::task::spawn_blocking(move || submitter.submit("/reset"))
            .await
            .unwrap();

        assert_eq!(result, Submit::Sent);
        let session = task.await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert!(session.messages().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stopped_controller_reports_closed() {
        let (mut submitter, _transport, task) = start();
        task.abort();
        let _ = task.await;

        let result = tokio::task::spawn_blocking(move || submitter.submit("hello"))
            .await
            .unwrap();

        assert_eq!(result, Submit::Closed);
    }
}
