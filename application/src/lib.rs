//! Application layer for streamchat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{SessionConfig, SwitchPolicy};
pub use error::SessionError;
pub use ports::{
    auth::{AuthProvider, AuthToken, StaticAuthProvider},
    conversation_logger::{
        ConversationEvent, ConversationEventKind, ConversationLogger, NoConversationLogger,
    },
    session_listener::{NoSessionListener, SessionListener},
    storage::{KeyValueStorage, StorageError},
    transport::{ChatRequest, ChatTransport, StreamHandle, TransportError},
};
pub use use_cases::chat_session::ChatSession;
pub use use_cases::persistence::{PersistenceError, SnapshotStore};
pub use use_cases::store::ConversationStore;
pub use use_cases::streaming::{
    CompletionCallback, IgnoreReason, SendOutcome, SessionHandle, StreamingController,
};
