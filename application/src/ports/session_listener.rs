//! Session notification port
//!
//! Defines callbacks for displaying a streamed reply while it arrives.
//! The conversation store stays the source of truth; listeners are
//! advisory and must not block.

use streamchat_domain::{ConversationId, SessionState};

/// Callback for streaming session updates
///
/// Implementations live in the presentation layer.
pub trait SessionListener: Send + Sync {
    /// Called once the user message and placeholder are in place.
    fn on_session_started(&self, _conversation_id: &ConversationId) {}

    /// Called for each chunk after it has been appended.
    fn on_chunk(&self, _conversation_id: &ConversationId, _chunk: &str) {}

    /// Called after the session slot has been released.
    fn on_session_settled(&self, _conversation_id: &ConversationId, _state: SessionState) {}
}

/// No-op listener for when live display is not needed
pub struct NoSessionListener;

impl SessionListener for NoSessionListener {}
