//! Port for the structured session transcript.
//!
//! `tracing` carries human-readable diagnostics. [`ConversationLogger`]
//! receives one machine-readable record per session milestone, which the
//! infrastructure layer writes out as JSONL.

use serde_json::Value;
use streamchat_domain::ConversationId;

/// Milestones recorded in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEventKind {
    SessionStarted,
    StreamCompleted,
    StreamFailed,
    StreamCancelled,
    ConversationCreated,
    ConversationSwitched,
}

impl ConversationEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationEventKind::SessionStarted => "session_started",
            ConversationEventKind::StreamCompleted => "stream_completed",
            ConversationEventKind::StreamFailed => "stream_failed",
            ConversationEventKind::StreamCancelled => "stream_cancelled",
            ConversationEventKind::ConversationCreated => "conversation_created",
            ConversationEventKind::ConversationSwitched => "conversation_switched",
        }
    }
}

/// One transcript record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    pub kind: ConversationEventKind,
    pub conversation_id: ConversationId,
    /// Extra fields; an object is flattened into the record.
    pub details: Value,
}

impl ConversationEvent {
    pub fn new(kind: ConversationEventKind, conversation_id: &ConversationId) -> Self {
        Self {
            kind,
            conversation_id: conversation_id.clone(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Sink for transcript records.
///
/// Synchronous and infallible: a failing transcript must never disturb a
/// live stream.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Used when no transcript is configured.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
