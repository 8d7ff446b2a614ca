use core::ops::Range;

use icu_properties::CodePointSetData;
use icu_properties::props::{EmojiModifier, EmojiPresentation, ExtendedPictographic, RegionalIndicator};
use unicode_segmentation::UnicodeSegmentation;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';
const COMBINING_KEYCAP: char = '\u{20E3}';

/// Caps how many emoji a single layout pass turns into emoji parts.
///
/// Once the limit is reached the remaining emoji are laid out as ordinary
/// styled text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiLimiter {
    limit: Option<usize>,
    accepted: usize,
}

impl EmojiLimiter {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, accepted: 0 }
    }

    /// Count one more emoji; `false` once the cap is reached.
    pub fn try_accept(&mut self) -> bool {
        match self.limit {
            Some(limit) if self.accepted >= limit => false,
            _ => {
                self.accepted += 1;
                true
            }
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

/// Finds emoji sequences inside a text range.
pub trait EmojiMatcher {
    /// Report every emoji in `text[range]` to `on_match` in order.
    ///
    /// Matching stops when the limiter refuses a match or when `on_match`
    /// returns `false`. Reported ranges are relative to `text`.
    fn replace_emoji(
        &self,
        text: &str,
        range: Range<usize>,
        limiter: &mut EmojiLimiter,
        on_match: &mut dyn FnMut(&str, Range<usize>) -> bool,
    );
}

/// Matcher driven by the Unicode emoji properties.
///
/// A grapheme cluster is an emoji when it is a regional-indicator flag pair,
/// a keycap sequence, or starts with an extended pictographic codepoint that
/// has emoji presentation (natively, through VS16, a modifier or a ZWJ
/// sequence).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeEmojiMatcher;

impl UnicodeEmojiMatcher {
    pub fn is_emoji_cluster(cluster: &str) -> bool {
        let mut chars = cluster.chars();
        let Some(first) = chars.next() else {
            return false;
        };

        if CodePointSetData::new::<RegionalIndicator>().contains(first) {
            return chars.next().is_some_and(|c| CodePointSetData::new::<RegionalIndicator>().contains(c));
        }
        if cluster.contains(COMBINING_KEYCAP) {
            return true;
        }
        if !CodePointSetData::new::<ExtendedPictographic>().contains(first) {
            return false;
        }
        CodePointSetData::new::<EmojiPresentation>().contains(first)
            || cluster.contains(VARIATION_SELECTOR_16)
            || cluster.contains(ZERO_WIDTH_JOINER)
            || cluster
                .chars()
                .any(|c| CodePointSetData::new::<EmojiModifier>().contains(c))
    }
}

impl EmojiMatcher for UnicodeEmojiMatcher {
    fn replace_emoji(
        &self,
        text: &str,
        range: Range<usize>,
        limiter: &mut EmojiLimiter,
        on_match: &mut dyn FnMut(&str, Range<usize>) -> bool,
    ) {
        let base = range.start;
        for (offset, cluster) in text[range].grapheme_indices(true) {
            if !Self::is_emoji_cluster(cluster) {
                continue;
            }
            if !limiter.try_accept() {
                return;
            }
            let start = base + offset;
            if !on_match(cluster, start..start + cluster.len()) {
                return;
            }
        }
    }
}

/// Matcher that never reports emoji.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmoji;

impl EmojiMatcher for NoEmoji {
    fn replace_emoji(
        &self,
        _text: &str,
        _range: Range<usize>,
        _limiter: &mut EmojiLimiter,
        _on_match: &mut dyn FnMut(&str, Range<usize>) -> bool,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(text: &str, limit: Option<usize>) -> Vec<Range<usize>> {
        let mut found = Vec::new();
        let mut limiter = EmojiLimiter::new(limit);
        UnicodeEmojiMatcher.replace_emoji(text, 0..text.len(), &mut limiter, &mut |_, r| {
            found.push(r);
            true
        });
        found
    }

    #[test]
    fn detects_presentation_emoji() {
        let text = "hi \u{1F600}!";
        assert_eq!(matches(text, None), vec![3..7]);
    }

    #[test]
    fn text_presentation_needs_variation_selector() {
        assert!(matches("\u{2764}", None).is_empty());
        assert_eq!(matches("\u{2764}\u{FE0F}", None).len(), 1);
    }

    #[test]
    fn flags_and_keycaps() {
        assert_eq!(matches("\u{1F1FA}\u{1F1F8}", None).len(), 1);
        assert_eq!(matches("1\u{FE0F}\u{20E3}", None).len(), 1);
        assert!(matches("123", None).is_empty());
    }

    #[test]
    fn limiter_caps_matches() {
        let text = "\u{1F600}\u{1F601}\u{1F602}";
        assert_eq!(matches(text, Some(2)).len(), 2);
    }

    #[test]
    fn callback_can_stop_matching() {
        let text = "\u{1F600}\u{1F601}";
        let mut seen = 0;
        let mut limiter = EmojiLimiter::new(None);
        UnicodeEmojiMatcher.replace_emoji(text, 0..text.len(), &mut limiter, &mut |_, _| {
            seen += 1;
            false
        });
        assert_eq!(seen, 1);
    }
}
