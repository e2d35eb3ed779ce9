//! Lexical helpers shared by the loader, search engine and statistics.
//!
//! Matching is purely lexical: case folding plus substring containment.
//! There is no stemming, root extraction or diacritic-insensitive
//! matching; a diacritized rendering only matches a diacritized query.

/// Arabic tashkeel marks: fathatan through sukun, plus the dagger alif.
fn is_tashkeel(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}')
}

/// True when the text carries at least one tashkeel mark.
///
/// This is the ingestion-time detector behind every record's
/// `diacritized` flag.
pub fn has_diacritics(text: &str) -> bool {
    text.chars().any(is_tashkeel)
}

/// Codepoint count of `text`. Record lengths are codepoints, not bytes,
/// so Arabic script does not inflate them.
pub fn codepoint_len(text: &str) -> usize {
    text.chars().count()
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.match_indices(needle).count()
}

/// A word character for boundary purposes. Tashkeel marks sit inside
/// words in diacritized text and must not break them.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || is_tashkeel(c)
}

/// Count occurrences of `needle` bounded by non-word characters (or the
/// ends of the text) on both sides.
pub fn whole_word_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    for (pos, matched) in haystack.match_indices(needle) {
        let bounded_left = haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let bounded_right = haystack[pos + matched.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if bounded_left && bounded_right {
            count += 1;
        }
    }
    count
}
