//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! where needed.

mod api;
mod logging;
mod repl;
mod session;
mod storage;

pub use api::{DEFAULT_BASE_URL, DEFAULT_CHAT_PATH, FileApiConfig};
pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use session::FileSessionConfig;
pub use storage::FileStorageConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("api.base_url must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("api.connect_timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("api.assistant_role cannot be empty")]
    EmptyAssistantRole,

    #[error("storage.key cannot be empty")]
    EmptyStorageKey,

    #[error("session.on_switch: {0}")]
    InvalidSwitchPolicy(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat backend settings
    pub api: FileApiConfig,
    /// Snapshot storage settings
    pub storage: FileStorageConfig,
    /// Session behavior settings
    pub session: FileSessionConfig,
    /// Conversation transcript settings
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidBaseUrl(
                self.api.base_url.clone(),
            ));
        }

        if self.api.connect_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.api.assistant_role.trim().is_empty() {
            return Err(ConfigValidationError::EmptyAssistantRole);
        }

        if self.storage.key.trim().is_empty() {
            return Err(ConfigValidationError::EmptyStorageKey);
        }

        self.session
            .parse_switch_policy()
            .map_err(ConfigValidationError::InvalidSwitchPolicy)?;

        Ok(())
    }
}
