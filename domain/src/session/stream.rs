//! Streaming events delivered by the chat transport.
//!
//! [`StreamEvent`] is the transport-neutral view of one server-sent event:
//! a text chunk, the end-of-stream sentinel, or an error.

/// Data payload that marks the end of a streamed reply.
pub const DONE_SENTINEL: &str = "[DONE]";

/// An event in a streaming chat response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk, to be appended verbatim.
    Delta(String),
    /// The `[DONE]` sentinel: the reply is complete.
    Done,
    /// The stream failed.
    Error(String),
}

impl StreamEvent {
    /// Decode the `data` field of a server-sent event.
    ///
    /// The sentinel must match exactly; anything else, including an empty
    /// payload or one with surrounding whitespace, is a chunk.
    pub fn from_data(data: &str) -> Self {
        if data == DONE_SENTINEL {
            StreamEvent::Done
        } else {
            StreamEvent::Delta(data.to_string())
        }
    }

    /// Returns the chunk text if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}
