//! Request failure taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::request::ErrorBody;

/// Category of a failed chat request, persisted alongside the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No response was obtained (connection refused, DNS, reset...).
    Transport,
    /// A response arrived with a non-success status.
    Protocol,
    /// A success response whose body could not be parsed.
    MalformedResponse,
    /// The configured request timeout elapsed.
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Protocol => "protocol",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a chat request did not produce a reply.
///
/// These never escape the request orchestrator; they are turned into a bot
/// message so the conversation log records the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    #[error("could not reach the chat API: {0}")]
    Transport(String),

    #[error("chat API returned status {status}: {detail}")]
    Protocol { status: u16, detail: String },

    #[error("malformed chat API response: {0}")]
    MalformedResponse(String),

    #[error("chat API did not respond within {after_ms} ms")]
    Timeout { after_ms: u64 },
}

impl RequestFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            RequestFailure::Transport(_) => FailureKind::Transport,
            RequestFailure::Protocol { .. } => FailureKind::Protocol,
            RequestFailure::MalformedResponse(_) => FailureKind::MalformedResponse,
            RequestFailure::Timeout { .. } => FailureKind::Timeout,
        }
    }

    /// Builds a protocol failure from a non-success response.
    ///
    /// The diagnostic is the body's `detail` when present, otherwise the
    /// status's canonical reason phrase, otherwise `HTTP <status>`.
    pub fn from_status(status: u16, canonical_reason: Option<&str>, body: &str) -> Self {
        let detail = ErrorBody::parse(body)
            .and_then(|parsed| parsed.detail_text())
            .or_else(|| canonical_reason.map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {status}"));

        RequestFailure::Protocol { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_detail() {
        let failure =
            RequestFailure::from_status(429, Some("Too Many Requests"), r#"{"detail":"rate limited"}"#);
        assert_eq!(
            failure,
            RequestFailure::Protocol {
                status: 429,
                detail: "rate limited".to_string()
            }
        );
        assert!(failure.to_string().contains("rate limited"));
        assert_eq!(failure.kind(), FailureKind::Protocol);
    }

    #[test]
    fn test_from_status_falls_back_to_reason_phrase() {
        let failure = RequestFailure::from_status(502, Some("Bad Gateway"), "<html></html>");
        assert!(failure.to_string().ends_with("Bad Gateway"));
    }

    #[test]
    fn test_from_status_without_reason() {
        let failure = RequestFailure::from_status(599, None, "");
        assert!(failure.to_string().ends_with("HTTP 599"));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::MalformedResponse).unwrap();
        assert_eq!(json, "\"malformed_response\"");
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
    }
}
