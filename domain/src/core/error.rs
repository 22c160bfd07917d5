//! Domain error types

use crate::conversation::value_objects::ConversationId;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("Message {index} not found in conversation {conversation_id}")]
    MessageNotFound {
        conversation_id: ConversationId,
        index: usize,
    },

    #[error("Message {index} in conversation {conversation_id} is not an assistant message")]
    NotAssistantMessage {
        conversation_id: ConversationId,
        index: usize,
    },

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Check if this error means the referenced conversation or message is gone
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::ConversationNotFound(_) | DomainError::MessageNotFound { .. }
        )
    }
}
