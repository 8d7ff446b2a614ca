use unicode_segmentation::UnicodeSegmentation;

/// End of the grapheme cluster that starts at `offset`, never past `limit`.
///
/// Returns `offset` when `offset >= limit`.
pub fn grapheme_end(text: &str, offset: usize, limit: usize) -> usize {
    if offset >= limit {
        return offset;
    }
    text[offset..limit]
        .graphemes(true)
        .next()
        .map_or(limit, |g| offset + g.len())
}
