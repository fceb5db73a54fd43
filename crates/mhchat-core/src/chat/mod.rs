//! Contract with the remote chat service.
//!
//! The chat service itself (intent detection, tool calls, slot extraction) is
//! an external collaborator. This module only describes the wire format and
//! the transport seam used by the request orchestrator.

mod failure;
mod request;
mod transport;

pub use failure::{FailureKind, RequestFailure};
pub use request::{ChatReply, ChatRequest, ErrorBody, Slots};
pub use transport::ChatTransport;
