//! Codepoint classes that drive line breaking, fake-bold decisions and the
//! monospace measurement fast path.

use core::ops::Range;

use icu_properties::CodePointMapData;
use icu_properties::props::GeneralCategory;
use unicode_bidi::{BidiClass, bidi_class};

pub fn general_category(c: char) -> GeneralCategory {
    CodePointMapData::<GeneralCategory>::new().get(c)
}

/// `Zs` codepoints, including the no-break space.
pub fn is_space_separator(c: char) -> bool {
    general_category(c) == GeneralCategory::SpaceSeparator
}

/// Whitespace as seen by the paragraph splitter: space separators and `\n`.
pub fn is_layout_space(c: char) -> bool {
    c == '\n' || is_space_separator(c)
}

/// Codepoints after which a line may be broken.
///
/// Punctuation qualifies, with the exception of a few characters that
/// usually glue to the following word. Space separators only qualify when
/// `allow_whitespace` is set.
pub fn is_splitter(c: char, allow_whitespace: bool) -> bool {
    match c {
        '\'' | '"' | '(' | '`' | '\u{00B7}' | '\u{00A0}' => return false,
        '_' => return true,
        _ => {}
    }
    match general_category(c) {
        GeneralCategory::OpenPunctuation
        | GeneralCategory::ClosePunctuation
        | GeneralCategory::ConnectorPunctuation
        | GeneralCategory::DashPunctuation
        | GeneralCategory::InitialPunctuation
        | GeneralCategory::FinalPunctuation
        | GeneralCategory::OtherPunctuation => true,
        GeneralCategory::SpaceSeparator => allow_whitespace,
        _ => false,
    }
}

/// Scripts written without spaces where every codepoint is a break
/// opportunity: kana, bopomofo, hangul and the CJK blocks.
pub fn needs_fill(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3100..=0x312F
        | 0xAC00..=0xD7AF
        | 0x2E80..=0x9FFF
        | 0x20000..=0x2FA1F)
}

/// Scripts whose fonts typically lack a bold face.
pub fn needs_fake_bold(c: char) -> bool {
    needs_fill(c)
        || matches!(c as u32,
            0x0D00..=0x0D7F // Malayalam
            | 0x0600..=0x06FF // Arabic
            | 0x0590..=0x05FF // Hebrew
            | 0xFF00..=0xFFEF) // Halfwidth and Fullwidth Forms
}

pub fn text_needs_fake_bold(text: &str) -> bool {
    text.chars().any(needs_fake_bold)
}

/// Latin, Cyrillic and Greek ranges measured as one space per codepoint
/// inside monospace entities.
pub fn is_monospace_range(c: char) -> bool {
    matches!(c as u32,
        0x0000..=0x024F
        | 0x0370..=0x03FF
        | 0x0400..=0x052F
        | 0x1C80..=0x1C8F
        | 0x1F00..=0x1FFF
        | 0x2DE0..=0x2DFF
        | 0xA640..=0xA69F)
}

/// Locate the next paragraph separator at or after `from`.
///
/// Returns the separator's byte range; `\r\n` counts as one separator.
pub fn find_paragraph_separator(text: &str, from: usize) -> Option<Range<usize>> {
    let (offset, c) = text[from..]
        .char_indices()
        .find(|&(_, c)| bidi_class(c) == BidiClass::B)?;
    let start = from + offset;
    let len = if text[start..].starts_with("\r\n") {
        2
    } else {
        c.len_utf8()
    };
    Some(start..start + len)
}

/// Locate the next ASCII space or `\n` at or after `from`.
pub fn find_space_or_newline(text: &str, from: usize) -> Option<Range<usize>> {
    text[from..]
        .char_indices()
        .find(|&(_, c)| c == ' ' || c == '\n')
        .map(|(offset, _)| from + offset..from + offset + 1)
}

/// Find where the first breakable piece of `text[range]` ends.
///
/// A piece runs up to and including the first splitter (together with any
/// splitters right after it, stopping after a space) or the first fill-script
/// codepoint. A leading splitter never ends a piece on its own, which keeps
/// `/commands` and similar tokens intact. Returns `range.end` when the range
/// has no break opportunity.
pub fn next_break(text: &str, range: Range<usize>) -> usize {
    let end = range.end;
    let Some(first) = text[range.clone()].chars().next() else {
        return end;
    };
    let mut search_start = range.start;
    if is_splitter(first, false) && range.start + first.len_utf8() < end {
        search_start += first.len_utf8();
    }

    for (offset, c) in text[search_start..end].char_indices() {
        let i = search_start + offset;
        let after = i + c.len_utf8();
        let split = if is_splitter(c, true) {
            let next_is_splitter = text[after..end]
                .chars()
                .next()
                .is_some_and(|n| is_splitter(n, false));
            let split = if i == search_start || after == end || !next_is_splitter {
                after
            } else {
                i
            };
            let absorb = !is_space_separator(c);
            Some((split, absorb))
        } else if needs_fill(c) {
            Some((after, true))
        } else {
            None
        };

        if let Some((mut split, absorb)) = split {
            if absorb {
                let mut cursor = after;
                while let Some(n) = text[cursor..end].chars().next() {
                    if !is_splitter(n, true) {
                        break;
                    }
                    cursor += n.len_utf8();
                    split = cursor;
                    if is_space_separator(n) {
                        break;
                    }
                }
            }
            return split;
        }
    }
    end
}
