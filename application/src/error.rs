//! Errors surfaced by the session facade.

use streamchat_domain::DomainError;
use thiserror::Error;

/// Errors returned to the UI layer.
///
/// Transport and persistence failures never show up here: they are
/// recovered inside the engine. What remains are caller mistakes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("No active conversation")]
    NoActiveConversation,
}

impl SessionError {
    pub fn is_not_found(&self) -> bool {
        match self {
            SessionError::Domain(e) => e.is_not_found(),
            SessionError::NoActiveConversation => false,
        }
    }
}
