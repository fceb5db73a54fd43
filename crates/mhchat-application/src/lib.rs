//! Application layer of the mhchat client.
//!
//! [`session::ChatSession`] is the request orchestrator and reset controller
//! for one conversation; [`controller::ChatController`] drives it from view
//! events on a single task and publishes snapshots for rendering.

pub mod clock;
pub mod controller;
pub mod session;

pub use controller::{ChatController, Key, Modifiers, ViewEvent};
pub use session::{ChatSession, RejectReason, SendOutcome, SendStart, SessionSettings};
