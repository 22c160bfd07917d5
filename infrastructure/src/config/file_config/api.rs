//! Chat API configuration from TOML (`[api]` section)

use crate::transport::DEFAULT_ASSISTANT_ROLE;
use serde::{Deserialize, Serialize};

/// Base URL of the chat backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Path of the streaming chat endpoint, relative to the base URL.
pub const DEFAULT_CHAT_PATH: &str = "/ai/chat/sse";

/// Raw API configuration from TOML
///
/// # Example
///
/// ```toml
/// [api]
/// base_url = "https://chat.example.com/api"
/// chat_path = "/ai/chat/sse"
/// connect_timeout_secs = 10
/// assistant_role = "ai"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Streaming endpoint path
    pub chat_path: String,
    /// Timeout for establishing the connection. The stream itself has no
    /// deadline.
    pub connect_timeout_secs: u64,
    /// Role tag for assistant turns in the request history
    pub assistant_role: String,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            connect_timeout_secs: 10,
            assistant_role: DEFAULT_ASSISTANT_ROLE.to_string(),
        }
    }
}

impl FileApiConfig {
    /// Full URL of the streaming endpoint.
    pub fn chat_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.chat_path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}
