//! Domain layer for streamchat
//!
//! This crate contains the core entities and invariants of the chat engine.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversations
//!
//! A [`ConversationCollection`] owns every [`Conversation`] in creation order
//! and tracks which one is active. It is the only place conversation data is
//! mutated.
//!
//! ## Streaming sessions
//!
//! A [`StreamingSession`] is the single in-flight assistant reply. It points
//! at a placeholder message and moves through [`SessionState`] as
//! [`StreamEvent`]s arrive.

pub mod conversation;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use conversation::{
    collection::ConversationCollection,
    entities::{Conversation, DEFAULT_TITLE, Message, Role},
    title::derive_title,
    value_objects::{ConversationId, ConversationSummary},
};
pub use core::error::DomainError;
pub use session::{
    state::{SessionState, StreamingSession},
    stream::{DONE_SENTINEL, StreamEvent},
};
