//! Chat transport port
//!
//! Defines how the application opens a server-to-client event stream for
//! one assistant reply. Implementations (adapters) live in the
//! infrastructure layer.

use crate::ports::auth::AuthToken;
use async_trait::async_trait;
use streamchat_domain::{Message, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while opening or reading a chat stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request rejected with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Stream ended before the end-of-stream marker")]
    UnexpectedEnd,

    #[error("Timeout")]
    Timeout,
}

/// History sent when opening a stream, oldest first.
///
/// Adapters choose the wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Handle for receiving streaming events for one reply.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` plus a [`CancellationToken`]
/// shared with the producer; [`close`](Self::close) tells the producer to
/// stop and drop the underlying connection.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    close: CancellationToken,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>, close: CancellationToken) -> Self {
        Self { receiver, close }
    }

    /// Create a handle together with the sending half, for adapters and tests.
    pub fn channel(buffer: usize) -> (mpsc::Sender<StreamEvent>, CancellationToken, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        let close = CancellationToken::new();
        (tx, close.clone(), Self::new(rx, close))
    }

    /// Receive the next event; `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Close the connection. Idempotent.
    pub fn close(&mut self) {
        self.close.cancel();
        self.receiver.close();
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_cancelled()
    }

}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.close.cancel();
    }
}

/// Transport that opens one authenticated event stream per reply
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Open a stream carrying `request`, authenticated with `token`.
    async fn open(
        &self,
        request: ChatRequest,
        token: &AuthToken,
    ) -> Result<StreamHandle, TransportError>;
}
