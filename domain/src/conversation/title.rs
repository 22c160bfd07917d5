//! Conversation title derivation.

use crate::core::string::take_chars;

/// Maximum number of characters kept from the first message.
pub const TITLE_MAX_CHARS: usize = 20;

/// Marker appended when the first message was longer than the title.
pub const TITLE_ELLIPSIS: &str = "...";

/// Derive a short conversation title from its first user message.
///
/// Keeps the first [`TITLE_MAX_CHARS`] characters and appends
/// [`TITLE_ELLIPSIS`] only when the input was longer than that.
pub fn derive_title(text: &str) -> String {
    match take_chars(text, TITLE_MAX_CHARS) {
        (head, true) => format!("{}{}", head, TITLE_ELLIPSIS),
        (head, false) => head.to_string(),
    }
}
