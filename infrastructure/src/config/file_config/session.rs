//! Session behavior configuration from TOML (`[session]` section)

use serde::{Deserialize, Serialize};
use streamchat_application::config::{
    DEFAULT_CANCELLED_MESSAGE, DEFAULT_ERROR_MESSAGE, SessionConfig, SwitchPolicy,
};

/// Raw session configuration from TOML
///
/// # Example
///
/// ```toml
/// [session]
/// on_switch = "cancel"
/// error_message = "The assistant is unavailable."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// What switching conversations does to a live reply: "continue" or
    /// "cancel"
    pub on_switch: String,
    /// Text that replaces a reply whose stream failed
    pub error_message: String,
    /// Text written into a reply cancelled before its first chunk
    pub cancelled_message: String,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            on_switch: "continue".to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            cancelled_message: DEFAULT_CANCELLED_MESSAGE.to_string(),
        }
    }
}

impl FileSessionConfig {
    pub fn parse_switch_policy(&self) -> Result<SwitchPolicy, String> {
        self.on_switch.parse()
    }

    /// Convert into the application-level config.
    ///
    /// An unknown switch policy falls back to the default; [`validate`]
    /// reports it.
    ///
    /// [`validate`]: super::FileConfig::validate
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_switch_policy(self.parse_switch_policy().unwrap_or_default())
            .with_error_message(self.error_message.clone())
            .with_cancelled_message(self.cancelled_message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_session_config() {
        let config = FileSessionConfig {
            on_switch: "cancel".to_string(),
            error_message: "oops".to_string(),
            ..Default::default()
        };
        let session = config.to_session_config();
        assert_eq!(session.on_switch, SwitchPolicy::Cancel);
        assert_eq!(session.error_message, "oops");
        assert_eq!(session.cancelled_message, DEFAULT_CANCELLED_MESSAGE);
    }

    #[test]
    fn test_unknown_policy_falls_back() {
        let config = FileSessionConfig {
            on_switch: "sometimes".to_string(),
            ..Default::default()
        };
        assert!(config.parse_switch_policy().is_err());
        assert_eq!(config.to_session_config().on_switch, SwitchPolicy::Continue);
    }
}
