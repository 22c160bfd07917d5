//! Application-level configuration.
//!
//! This module provides configuration types that control how the session
//! facade and streaming controller behave.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Text written into the assistant placeholder when a stream fails.
pub const DEFAULT_ERROR_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

/// Text written into an empty assistant placeholder when a stream is
/// cancelled before its first chunk.
pub const DEFAULT_CANCELLED_MESSAGE: &str = "[response cancelled]";

/// Storage key the conversation snapshot is saved under.
pub const DEFAULT_SNAPSHOT_KEY: &str = "chatState";

/// What switching conversations does to a live stream aimed elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPolicy {
    /// The stream keeps writing to its original conversation.
    #[default]
    Continue,
    /// The stream is cancelled before the switch takes effect.
    Cancel,
}

impl FromStr for SwitchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" | "background" => Ok(SwitchPolicy::Continue),
            "cancel" | "abort" => Ok(SwitchPolicy::Cancel),
            other => Err(format!(
                "unknown switch policy '{}', expected 'continue' or 'cancel'",
                other
            )),
        }
    }
}

/// Session behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub on_switch: SwitchPolicy,
    pub error_message: String,
    pub cancelled_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            on_switch: SwitchPolicy::default(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            cancelled_message: DEFAULT_CANCELLED_MESSAGE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_switch_policy(mut self, policy: SwitchPolicy) -> Self {
        self.on_switch = policy;
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn with_cancelled_message(mut self, message: impl Into<String>) -> Self {
        self.cancelled_message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_policy_from_str() {
        assert_eq!("continue".parse(), Ok(SwitchPolicy::Continue));
        assert_eq!("Cancel".parse(), Ok(SwitchPolicy::Cancel));
        assert!("sometimes".parse::<SwitchPolicy>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.on_switch, SwitchPolicy::Continue);
        assert_eq!(config.error_message, DEFAULT_ERROR_MESSAGE);
    }
}
