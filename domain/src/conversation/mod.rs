//! Conversation domain.
//!
//! - [`entities::Conversation`]: one chat thread with its messages
//! - [`entities::Message`]: a single user or assistant message
//! - [`collection::ConversationCollection`]: every conversation plus the active selection
//! - [`title::derive_title`]: title derived from the first user message

pub mod collection;
pub mod entities;
pub mod title;
pub mod value_objects;
