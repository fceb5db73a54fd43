//! Shared test doubles for the application crate.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use mhchat_application::clock::Clock;
use mhchat_core::chat::{ChatReply, ChatRequest, ChatTransport, RequestFailure};
use mhchat_core::error::Result;
use mhchat_core::session::{Message, MessageStore};
use mhchat_core::MhChatError;

/// Returns queued outcomes in order and records every request.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<std::result::Result<ChatReply, RequestFailure>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<std::result::Result<ChatReply, RequestFailure>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(reply: ChatReply) -> Arc<Self> {
        Self::new(vec![Ok(reply)])
    }

    pub fn failing(failure: RequestFailure) -> Arc<Self> {
        Self::new(vec![Err(failure)])
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> std::result::Result<ChatReply, RequestFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::new("ok")))
    }
}

/// Never answers.
pub struct SilentTransport {
    pub calls: AtomicUsize,
}

impl SilentTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for SilentTransport {
    async fn send(&self, _request: &ChatRequest) -> std::result::Result<ChatReply, RequestFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// A clock frozen at one instant.
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    pub fn at(hour: u32, min: u32, sec: u32) -> Arc<Self> {
        Arc::new(Self(
            Local
                .with_ymd_and_hms(2024, 5, 1, hour, min, sec)
                .unwrap(),
        ))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// A store whose writes always fail.
pub struct BrokenStore;

impl MessageStore for BrokenStore {
    fn load(&self) -> Result<Vec<Message>> {
        Err(MhChatError::storage("disk unavailable"))
    }

    fn save(&self, _messages: &[Message]) -> Result<()> {
        Err(MhChatError::storage("disk unavailable"))
    }

    fn clear(&self) -> Result<()> {
        Err(MhChatError::storage("disk unavailable"))
    }
}
