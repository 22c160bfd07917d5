//! The authoritative collection of conversations.
//!
//! [`ConversationCollection`] is the single writer for conversation data:
//! every mutation (new conversation, appended message, streamed chunk,
//! error substitution) goes through one of its methods so the invariants
//! below hold at all times.
//!
//! - Conversations keep creation order; nothing is reordered or removed.
//! - `active_conversation_id`, when set, resolves to a member.
//! - Only assistant messages have their content mutated after creation.

use super::entities::{Conversation, Message};
use super::value_objects::{ConversationId, ConversationSummary};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Ordered set of conversations plus the active selection.
///
/// Serializes as `{"conversations": [...], "activeConversationId": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCollection {
    #[serde(default)]
    conversations: Vec<Conversation>,
    #[serde(default)]
    active_conversation_id: Option<ConversationId>,
}

impl ConversationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new empty conversation and return its id.
    ///
    /// The active selection is left alone; the caller decides whether to
    /// switch to it.
    pub fn create_conversation(&mut self) -> ConversationId {
        let conversation = Conversation::new();
        let id = conversation.id().clone();
        self.conversations.push(conversation);
        id
    }

    /// Append a new empty conversation and make it active.
    pub fn start_conversation(&mut self) -> ConversationId {
        let id = self.create_conversation();
        self.active_conversation_id = Some(id.clone());
        id
    }

    pub fn set_active(&mut self, id: &ConversationId) -> Result<(), DomainError> {
        if !self.contains(id) {
            return Err(DomainError::ConversationNotFound(id.clone()));
        }
        self.active_conversation_id = Some(id.clone());
        Ok(())
    }

    /// Append a message and return its index within the conversation.
    pub fn append_message(
        &mut self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<usize, DomainError> {
        Ok(self.get_mut(conversation_id)?.push(message))
    }

    /// Append streamed text to an assistant message.
    pub fn append_chunk(
        &mut self,
        conversation_id: &ConversationId,
        index: usize,
        chunk: &str,
    ) -> Result<(), DomainError> {
        self.assistant_message_mut(conversation_id, index)?
            .content
            .push_str(chunk);
        Ok(())
    }

    /// Overwrite an assistant message's content.
    ///
    /// Reserved for the terminal error substitution of a failed stream.
    pub fn replace_content(
        &mut self,
        conversation_id: &ConversationId,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.assistant_message_mut(conversation_id, index)?.content = content.into();
        Ok(())
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.get(id).is_some()
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active_conversation_id.as_ref()
    }

    pub fn get_active(&self) -> Option<&Conversation> {
        self.active_conversation_id
            .as_ref()
            .and_then(|id| self.get(id))
    }

    /// Messages of the active conversation, empty when nothing is active.
    pub fn active_messages(&self) -> &[Message] {
        self.get_active().map(Conversation::messages).unwrap_or(&[])
    }

    /// Messages strictly before `index`, i.e. the history sent upstream
    /// when `index` is the streaming placeholder.
    pub fn history_before(
        &self,
        conversation_id: &ConversationId,
        index: usize,
    ) -> Result<Vec<Message>, DomainError> {
        let conversation = self
            .get(conversation_id)
            .ok_or_else(|| DomainError::ConversationNotFound(conversation_id.clone()))?;
        let end = index.min(conversation.len());
        Ok(conversation.messages()[..end].to_vec())
    }

    /// `{id, title}` pairs, most recently created first.
    pub fn list_summaries(&self) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .rev()
            .map(Conversation::summary)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Whether the active selection resolves to a member.
    ///
    /// Always true for collections built through this API; a restored
    /// snapshot may still carry a dangling id.
    pub fn has_valid_active(&self) -> bool {
        self.get_active().is_some()
    }

    fn get_mut(&mut self, id: &ConversationId) -> Result<&mut Conversation, DomainError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| DomainError::ConversationNotFound(id.clone()))
    }

    fn assistant_message_mut(
        &mut self,
        conversation_id: &ConversationId,
        index: usize,
    ) -> Result<&mut Message, DomainError> {
        let message = self
            .get_mut(conversation_id)?
            .message_mut(index)
            .ok_or_else(|| DomainError::MessageNotFound {
                conversation_id: conversation_id.clone(),
                index,
            })?;
        if !message.is_assistant() {
            return Err(DomainError::NotAssistantMessage {
                conversation_id: conversation_id.clone(),
                index,
            });
        }
        Ok(message)
    }
}
