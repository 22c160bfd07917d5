//! Session facade consumed by the UI layer.
//!
//! [`ChatSession`] wraps the [`StreamingController`] and adds conversation
//! management: restoring the saved state, starting and switching
//! conversations, and persisting after each of those.

use crate::config::SwitchPolicy;
use crate::error::SessionError;
use crate::ports::auth::AuthToken;
use crate::ports::conversation_logger::{ConversationEvent, ConversationEventKind};
use crate::use_cases::store::ConversationStore;
use crate::use_cases::streaming::{CompletionCallback, SendOutcome, StreamingController};
use streamchat_domain::{
    Conversation, ConversationCollection, ConversationId, ConversationSummary, Message,
};
use tracing::{debug, info, warn};

/// Public API of the conversation engine
pub struct ChatSession {
    controller: StreamingController,
}

impl ChatSession {
    pub fn new(controller: StreamingController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &StreamingController {
        &self.controller
    }

    pub fn store(&self) -> &ConversationStore {
        self.controller.store()
    }

    /// Restore the saved conversations and make sure one is active.
    ///
    /// A missing or unreadable snapshot starts from scratch. If nothing was
    /// restored, or the restored active id is dangling, a fresh conversation
    /// is created and activated. Returns the active conversation.
    pub fn init(&self) -> ConversationId {
        if self.controller.is_loading() {
            warn!("init called while a reply is streaming, keeping current state");
        } else if let Some(collection) = self.controller.snapshots().load() {
            info!(
                "Restored {} conversation(s) from '{}'",
                collection.len(),
                self.controller.snapshots().key()
            );
            self.store().replace(collection);
        }

        let active = self.store().read(|c| {
            if c.has_valid_active() {
                c.active_id().cloned()
            } else {
                None
            }
        });

        match active {
            Some(id) => id,
            None => {
                debug!("No usable active conversation, starting a new one");
                self.create_and_activate()
            }
        }
    }

    /// Start a new conversation and make it active.
    ///
    /// Returns `None` without doing anything when the active conversation is
    /// still empty and other conversations exist, so empty conversations
    /// do not pile up.
    pub fn start_new_conversation(&self) -> Option<ConversationId> {
        let redundant = self.store().read(|c| {
            c.len() > 1 && c.get_active().is_some_and(Conversation::is_empty)
        });
        if redundant {
            debug!("Active conversation is still empty, not starting another");
            return None;
        }

        Some(self.create_and_activate())
    }

    /// Make `id` the active conversation.
    pub fn switch_conversation(&self, id: &ConversationId) -> Result<(), SessionError> {
        self.store().set_active(id)?;
        self.apply_switch_policy(id);
        self.persist();

        info!("Switched to conversation {}", id);
        self.controller.conversation_logger().log(ConversationEvent::new(
            ConversationEventKind::ConversationSwitched,
            id,
        ));
        Ok(())
    }

    /// Send `question` in the active conversation.
    ///
    /// See [`StreamingController::send_message`].
    pub fn send_message(
        &self,
        question: &str,
        token: AuthToken,
        on_complete: Option<CompletionCallback>,
    ) -> Result<SendOutcome, SessionError> {
        self.controller.send_message(question, token, on_complete)
    }

    /// Cancel the live reply, if any.
    pub fn cancel(&self) -> bool {
        self.controller.cancel()
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    /// Conversations, most recent first.
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.store().list_summaries()
    }

    pub fn active_conversation(&self) -> Option<Conversation> {
        self.store().get_active()
    }

    pub fn active_messages(&self) -> Vec<Message> {
        self.store().active_messages()
    }

    fn create_and_activate(&self) -> ConversationId {
        let id = self.store().write(ConversationCollection::start_conversation);

        self.apply_switch_policy(&id);
        self.persist();

        info!("Started conversation {}", id);
        self.controller.conversation_logger().log(ConversationEvent::new(
            ConversationEventKind::ConversationCreated,
            &id,
        ));
        id
    }

    fn apply_switch_policy(&self, new_active: &ConversationId) {
        if self.controller.config().on_switch != SwitchPolicy::Cancel {
            return;
        }
        if let Some(target) = self.controller.active_target()
            && &target != new_active
        {
            info!(
                "Leaving conversation {} with a live reply, cancelling it",
                target
            );
            self.controller.cancel();
        }
    }

    fn persist(&self) {
        self.controller
            .snapshots()
            .save_or_warn(&self.store().snapshot());
    }
}
