//! Streaming session domain.
//!
//! - [`state::StreamingSession`]: the single live streamed reply
//! - [`state::SessionState`]: its lifecycle states
//! - [`stream::StreamEvent`]: transport events that drive it

pub mod state;
pub mod stream;
