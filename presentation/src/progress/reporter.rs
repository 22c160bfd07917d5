//! Live display of a streaming reply

use crate::output::console::ConsoleFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use streamchat_application::config::DEFAULT_ERROR_MESSAGE;
use streamchat_application::ports::session_listener::SessionListener;
use streamchat_domain::{ConversationId, Role, SessionState};

/// Prints chunks to stdout as they arrive.
///
/// A spinner is shown from the moment the request is sent until the first
/// chunk (or the end of the session).
pub struct StreamReporter {
    show_progress: bool,
    error_message: String,
    spinner: Mutex<Option<ProgressBar>>,
    label_printed: Mutex<bool>,
}

impl StreamReporter {
    pub fn new() -> Self {
        Self {
            show_progress: true,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            spinner: Mutex::new(None),
            label_printed: Mutex::new(false),
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Text the session writes into a failed reply.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// What to print once a reply settles, given whether chunks were shown.
    fn settlement_text(&self, label_printed: bool, state: SessionState) -> String {
        let mut text = String::new();
        if label_printed {
            text.push('\n');
        }
        if let Some(note) = ConsoleFormatter::settled(state, &self.error_message) {
            if state == SessionState::Failed && !label_printed {
                text.push_str(&ConsoleFormatter::role_label(Role::Assistant));
                text.push(' ');
            }
            text.push_str(&note);
            text.push('\n');
        }
        text
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            spinner.finish_and_clear();
        }
    }
}

impl Default for StreamReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionListener for StreamReporter {
    fn on_session_started(&self, _conversation_id: &ConversationId) {
        *self
            .label_printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = false;

        if self.show_progress {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(Self::spinner_style());
            spinner.set_message("Waiting for reply...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(spinner);
        }
    }

    fn on_chunk(&self, _conversation_id: &ConversationId, chunk: &str) {
        self.clear_spinner();

        let mut stdout = io::stdout().lock();
        let mut label_printed = self
            .label_printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*label_printed {
            let _ = write!(stdout, "{} ", ConsoleFormatter::role_label(Role::Assistant));
            *label_printed = true;
        }
        let _ = write!(stdout, "{}", chunk);
        let _ = stdout.flush();
    }

    fn on_session_settled(&self, _conversation_id: &ConversationId, state: SessionState) {
        self.clear_spinner();

        let printed = *self
            .label_printed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{}", self.settlement_text(printed, state));
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_reply_shows_configured_error() {
        let reporter = StreamReporter::new()
            .with_progress(false)
            .with_error_message("Backend is down");

        let after_chunks = reporter.settlement_text(true, SessionState::Failed);
        assert!(after_chunks.starts_with('\n'));
        assert!(after_chunks.contains("Backend is down"));

        let without_chunks = reporter.settlement_text(false, SessionState::Failed);
        assert!(without_chunks.contains("Assistant:"));
        assert!(without_chunks.contains("Backend is down"));
    }

    #[test]
    fn test_completed_reply_only_ends_the_line() {
        let reporter = StreamReporter::new().with_progress(false);
        assert_eq!(reporter.settlement_text(true, SessionState::Completed), "\n");
        assert_eq!(reporter.settlement_text(false, SessionState::Completed), "");
    }

    #[test]
    fn test_cancelled_reply_is_noted() {
        let reporter = StreamReporter::new().with_progress(false);
        let text = reporter.settlement_text(false, SessionState::Cancelled);
        assert!(text.contains("cancelled"));
        assert!(!text.contains(DEFAULT_ERROR_MESSAGE));
    }
}
