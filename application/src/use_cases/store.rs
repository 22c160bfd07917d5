//! Shared handle to the conversation collection.
//!
//! The facade, the streaming task and the UI all read the same
//! [`ConversationCollection`]. [`ConversationStore`] is a cheap, cloneable
//! handle around it. Every mutation is a single call into the collection's
//! own methods under a short-lived lock that is never held across an
//! `.await`, so event handlers apply atomically and in arrival order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use streamchat_domain::{
    Conversation, ConversationCollection, ConversationId, ConversationSummary, DomainError,
    Message,
};

/// Cloneable handle to the single conversation collection
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<Mutex<ConversationCollection>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collection(collection: ConversationCollection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(collection)),
        }
    }

    /// Run a read-only closure against the collection.
    pub fn read<R>(&self, f: impl FnOnce(&ConversationCollection) -> R) -> R {
        f(&self.lock())
    }

    /// Run a mutating closure against the collection.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut ConversationCollection) -> R) -> R {
        f(&mut self.lock())
    }

    /// Deep copy of the current state, e.g. for persistence.
    pub fn snapshot(&self) -> ConversationCollection {
        self.lock().clone()
    }

    /// Swap in a restored collection.
    pub(crate) fn replace(&self, collection: ConversationCollection) {
        *self.lock() = collection;
    }

    pub fn create_conversation(&self) -> ConversationId {
        self.write(|c| c.create_conversation())
    }

    pub fn set_active(&self, id: &ConversationId) -> Result<(), DomainError> {
        self.write(|c| c.set_active(id))
    }

    pub fn append_message(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<usize, DomainError> {
        self.write(|c| c.append_message(conversation_id, message))
    }

    pub(crate) fn append_chunk(
        &self,
        conversation_id: &ConversationId,
        index: usize,
        chunk: &str,
    ) -> Result<(), DomainError> {
        self.write(|c| c.append_chunk(conversation_id, index, chunk))
    }

    pub(crate) fn replace_content(
        &self,
        conversation_id: &ConversationId,
        index: usize,
        content: &str,
    ) -> Result<(), DomainError> {
        self.write(|c| c.replace_content(conversation_id, index, content))
    }

    pub fn get(&self, id: &ConversationId) -> Option<Conversation> {
        self.read(|c| c.get(id).cloned())
    }

    pub fn get_active(&self) -> Option<Conversation> {
        self.read(|c| c.get_active().cloned())
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.read(|c| c.active_id().cloned())
    }

    pub fn active_messages(&self) -> Vec<Message> {
        self.read(|c| c.active_messages().to_vec())
    }

    pub fn list_summaries(&self) -> Vec<ConversationSummary> {
        self.read(ConversationCollection::list_summaries)
    }

    pub fn len(&self) -> usize {
        self.read(ConversationCollection::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(ConversationCollection::is_empty)
    }

    fn lock(&self) -> MutexGuard<'_, ConversationCollection> {
        // A panic while holding the lock cannot leave the collection
        // half-updated: each mutation is a single method call.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
