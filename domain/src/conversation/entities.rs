//! Conversation domain entities

use super::title::derive_title;
use super::value_objects::{ConversationId, ConversationSummary};
use serde::{Deserialize, Serialize};

/// Title given to a conversation before its first message arrives.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// Older snapshots tag assistant replies as `"ai"`.
    #[serde(alias = "ai")]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
///
/// `role` is fixed at creation. Only the conversation collection mutates
/// `content`, and only for assistant messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Empty assistant message marking where a streamed reply will land.
    pub fn placeholder() -> Self {
        Self::assistant(String::new())
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// One independent chat thread (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    title: String,
    #[serde(default)]
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation with a fresh id and the default title
    pub fn new() -> Self {
        Self::with_id(ConversationId::generate())
    }

    pub fn with_id(id: ConversationId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    /// Append a message, returning its index.
    ///
    /// The title is derived here, on the very first user message, and
    /// never touched again.
    pub(crate) fn push(&mut self, message: Message) -> usize {
        if self.messages.is_empty() && message.role == Role::User {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub(crate) fn message_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_empty_with_default_title() {
        let c = Conversation::new();
        assert!(c.is_empty());
        assert_eq!(c.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_first_user_message_sets_title_once() {
        let mut c = Conversation::new();
        c.push(Message::user("abcdefghijklmnopqrstuvwxyz"));
        assert_eq!(c.title(), "abcdefghijklmnopqrst...");

        c.push(Message::placeholder());
        c.push(Message::user("another question"));
        assert_eq!(c.title(), "abcdefghijklmnopqrst...");
    }

    #[test]
    fn test_push_returns_index() {
        let mut c = Conversation::new();
        assert_eq!(c.push(Message::user("hi")), 0);
        assert_eq!(c.push(Message::placeholder()), 1);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        let legacy: Role = serde_json::from_str("\"ai\"").unwrap();
        assert_eq!(legacy, Role::Assistant);
    }
}
