//! Auth provider port
//!
//! The engine treats credentials as opaque: a token is handed to the
//! transport and never inspected, logged, or cached by the engine itself.

use std::fmt;

/// Opaque bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token text, for the transport's `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Supplies a bearer token on demand
pub trait AuthProvider: Send + Sync {
    /// Current token, or `None` when the user is not signed in.
    fn token(&self) -> Option<AuthToken>;
}

/// Provider backed by a fixed token (CLI flag or environment)
pub struct StaticAuthProvider {
    token: Option<AuthToken>,
}

impl StaticAuthProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(AuthToken::new),
        }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn token(&self) -> Option<AuthToken> {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let token = AuthToken::new("secret-value");
        let printed = format!("{:?}", token);
        assert!(!printed.contains("secret-value"));
        assert_eq!(token.expose(), "secret-value");
    }

    #[test]
    fn static_provider_ignores_empty_token() {
        assert!(StaticAuthProvider::new(Some(String::new())).token().is_none());
        assert!(StaticAuthProvider::new(None).token().is_none());
        assert_eq!(
            StaticAuthProvider::new(Some("t".into())).token(),
            Some(AuthToken::new("t"))
        );
    }
}
