//! Adapters for the [`ChatTransport`](streamchat_application::ChatTransport) port.

mod sse;

pub use sse::{DEFAULT_ASSISTANT_ROLE, SseChatTransport};
