//! Presentation-level configuration
//!
//! Configuration for console output and REPL behavior.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Show a spinner until the first chunk arrives
    pub show_progress: bool,
    /// Path to history file; `None` uses the platform data directory
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_progress: true,
            history_file: None,
        }
    }
}

impl ReplConfig {
    /// History file location, falling back to
    /// `$XDG_DATA_HOME/streamchat/history.txt`.
    pub fn resolve_history_file(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("streamchat").join("history.txt")))
    }
}
