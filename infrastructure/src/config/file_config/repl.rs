//! `[repl]`: interactive prompt settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Colored console output
    pub color: bool,
    /// Show a spinner while waiting for the first chunk
    pub show_progress: bool,
    /// Line history location; unset uses the user data dir
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_progress: true,
            history_file: None,
        }
    }
}
