//! String utilities for the domain layer.

/// Split off the first `max_chars` characters of `s`.
///
/// Counts Unicode scalar values rather than bytes, so the cut always lands
/// on a character boundary. The flag is `true` when anything was dropped.
pub fn take_chars(s: &str, max_chars: usize) -> (&str, bool) {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => (&s[..end], true),
        None => (s, false),
    }
}

/// Truncate a string to `max_chars` characters, appending `...` when cut.
///
/// Used for log previews of user input and streamed text.
pub fn preview(s: &str, max_chars: usize) -> String {
    match take_chars(s, max_chars) {
        (head, true) => format!("{}...", head),
        (head, false) => head.to_string(),
    }
}
