//! Default post titles.
//!
//! A post saved without a title gets one built from the start of its text.
//! The derived value is persisted like any other title and is never
//! recomputed once present.

/// Number of leading words taken from the post text
pub const DEFAULT_TITLE_WORDS: usize = 4;

/// Marker appended after the leading words
pub const TITLE_ELLIPSIS: &str = "...";

/// Build a title from the first four whitespace-separated words of `text`.
///
/// The ellipsis is always appended, so short or empty text still yields a
/// non-empty title.
pub fn default_title(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().take(DEFAULT_TITLE_WORDS).collect();
    let mut title = words.join(" ");
    title.push_str(TITLE_ELLIPSIS);
    title
}

/// A title counts as missing when it is empty after trimming.
pub fn is_blank_title(title: &str) -> bool {
    title.trim().is_empty()
}
