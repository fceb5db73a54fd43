//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{MhChatError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/v1/chat";
pub const DEFAULT_SESSION_ID: &str = "demo-user";
pub const DEFAULT_STORAGE_NAMESPACE: &str = "mh-chat-messages";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

pub const ENV_ENDPOINT: &str = "MHCHAT_ENDPOINT";
pub const ENV_SESSION_ID: &str = "MHCHAT_SESSION_ID";
pub const ENV_TIMEOUT_SECS: &str = "MHCHAT_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "MHCHAT_DATA_DIR";

/// Settings read from `config.toml`, then overridden by environment and CLI.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat endpoint URL that receives the POST.
    pub endpoint: String,
    /// Fixed caller identity sent with every request.
    pub session_id: String,
    /// Request timeout in seconds; `0` waits indefinitely.
    pub request_timeout_secs: u64,
    /// File stem of the persisted message log.
    pub storage_namespace: String,
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// strftime pattern for message timestamps.
    pub time_format: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
            data_dir: None,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Applies overrides from process environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `MHCHAT_*` names.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(session_id) = get(ENV_SESSION_ID) {
            self.session_id = session_id;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                MhChatError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number, got '{secs}'"))
            })?;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Checks the values that would otherwise fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(MhChatError::config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        if self.session_id.trim().is_empty() {
            return Err(MhChatError::config("session_id must not be empty"));
        }

        let namespace_ok = !self.storage_namespace.is_empty()
            && self
                .storage_namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !namespace_ok {
            return Err(MhChatError::config(format!(
                "storage_namespace may only contain letters, digits, '-' and '_', got '{}'",
                self.storage_namespace
            )));
        }

        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(MhChatError::config(format!(
                "time_format is not a valid strftime pattern: '{}'",
                self.time_format
            )));
        }

        Ok(())
    }
}
