//! Snapshot storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use streamchat_application::config::DEFAULT_SNAPSHOT_KEY;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding stored values. `None` uses the platform data
    /// directory.
    pub dir: Option<String>,
    /// Key the conversation snapshot is stored under
    pub key: String,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }
}

impl FileStorageConfig {
    /// Resolve the storage directory.
    ///
    /// Falls back to `$XDG_DATA_HOME/streamchat` (or the platform
    /// equivalent), then to `./.streamchat`.
    pub fn resolve_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .map(|d| d.join("streamchat"))
            .unwrap_or_else(|| PathBuf::from(".streamchat"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let config = FileStorageConfig {
            dir: Some("/tmp/chats".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_dir(), PathBuf::from("/tmp/chats"));
    }

    #[test]
    fn test_default_key() {
        assert_eq!(FileStorageConfig::default().key, "chatState");
    }
}
