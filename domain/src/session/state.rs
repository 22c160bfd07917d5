//! Streaming session state machine.
//!
//! ```text
//! Idle ──send──▶ Streaming ──chunk──▶ Streaming
//!                    │
//!                    ├──[DONE]──▶ Completed
//!                    ├──error───▶ Failed
//!                    └──cancel──▶ Cancelled
//! ```
//!
//! Terminal states carry no memory: once the slot is released the
//! controller is back to `Idle`.

use crate::conversation::value_objects::ConversationId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Streaming)
                | (Streaming, Streaming)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Streaming, Cancelled)
                | (Completed, Idle)
                | (Failed, Idle)
                | (Cancelled, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one live streaming session (Entity)
///
/// Holds a non-owning reference into the conversation collection: the
/// target conversation id and the index of its trailing placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingSession {
    conversation_id: ConversationId,
    placeholder_index: usize,
    state: SessionState,
    chunks_applied: usize,
}

impl StreamingSession {
    /// Enter `Streaming` for the given placeholder.
    pub fn start(conversation_id: ConversationId, placeholder_index: usize) -> Self {
        Self {
            conversation_id,
            placeholder_index,
            state: SessionState::Streaming,
            chunks_applied: 0,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn placeholder_index(&self) -> usize {
        self.placeholder_index
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn chunks_applied(&self) -> usize {
        self.chunks_applied
    }

    pub fn is_streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    /// Record a chunk as applied (`Streaming` self-loop).
    pub fn record_chunk(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Streaming)?;
        self.chunks_applied += 1;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Completed)
    }

    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Failed)
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Cancelled)
    }

    fn transition(&mut self, next: SessionState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> StreamingSession {
        StreamingSession::start(ConversationId::from("c"), 1)
    }

    #[test]
    fn test_start_is_streaming() {
        let s = session();
        assert!(s.is_streaming());
        assert_eq!(s.placeholder_index(), 1);
        assert_eq!(s.chunks_applied(), 0);
    }

    #[test]
    fn test_chunks_keep_streaming() {
        let mut s = session();
        s.record_chunk().unwrap();
        s.record_chunk().unwrap();
        assert!(s.is_streaming());
        assert_eq!(s.chunks_applied(), 2);
    }

    #[test]
    fn test_each_terminal_transition() {
        let mut s = session();
        s.complete().unwrap();
        assert_eq!(s.state(), SessionState::Completed);

        let mut s = session();
        s.fail().unwrap();
        assert_eq!(s.state(), SessionState::Failed);

        let mut s = session();
        s.cancel().unwrap();
        assert_eq!(s.state(), SessionState::Cancelled);
    }

    #[test]
    fn test_terminal_states_reject_further_events() {
        let mut s = session();
        s.complete().unwrap();
        assert!(s.record_chunk().is_err());
        assert!(s.fail().is_err());
        assert!(s.cancel().is_err());
        assert_eq!(s.state(), SessionState::Completed);
    }

    #[test]
    fn test_transition_table() {
        use SessionState::*;
        assert!(Idle.can_transition_to(Streaming));
        assert!(!Idle.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Idle));
        assert!(Cancelled.can_transition_to(Idle));
        assert!(!Failed.can_transition_to(Streaming));
        assert!(Completed.is_terminal());
        assert!(!Streaming.is_terminal());
    }
}
