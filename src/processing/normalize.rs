//! Input sanitizing and source-text bounds.

/// Inline text must be strictly longer than this (after trimming) to skip file extraction.
pub const INLINE_MIN_CHARS: usize = 10;

/// Upper bound, in characters, on the text sent for summarization.
pub const MAX_SOURCE_CHARS: usize = 12_000;

/// Sanitize arbitrary string input by trimming whitespace and dropping empties.
pub(crate) fn sanitize_string(value: Option<String>) -> Option<String> {
    value.and_then(|input| {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Whether inline text is long enough to be summarized without consulting a file.
pub(crate) fn has_usable_inline_text(text: &str) -> bool {
    text.trim().chars().count() > INLINE_MIN_CHARS
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Bound `text` to its first [`MAX_SOURCE_CHARS`] characters. Whitespace counts like any other
/// character.
pub fn bound_source_text(text: &str) -> String {
    truncate_chars(text, MAX_SOURCE_CHARS).to_string()
}
