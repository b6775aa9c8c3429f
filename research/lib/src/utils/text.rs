//! Text helpers shared by the stages.

/// Returns at most `max_chars` characters of `text`, never splitting a
/// character. Borrows when no truncation is needed.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Whether `text` is longer than `max_chars` characters.
pub fn exceeds_chars(text: &str, max_chars: usize) -> bool {
    text.char_indices().nth(max_chars).is_some()
}
