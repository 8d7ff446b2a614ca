use unicode_segmentation::UnicodeSegmentation;

use crate::font::ScaledFontMetrics;
use crate::unicode::classify::needs_fill;

/// Horizontal ellipsis appended by truncation.
pub const ELLIPSIS: &str = "\u{2026}";

/// Style descriptor handed to a [`MetricsProvider`].
///
/// Colors and decorations do not affect measurement and are resolved at draw
/// time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    /// Bold requested for a script without a real bold face; the provider
    /// is expected to embolden synthetically.
    pub fake_bold: bool,
}

impl TextStyle {
    pub const REGULAR: TextStyle = TextStyle {
        bold: false,
        italic: false,
        monospace: false,
        fake_bold: false,
    };
}

/// Font metrics and width measurement.
///
/// The layout engine treats the provider as total: a missing glyph must be
/// handled by the provider's own fallback policy, never by an error.
pub trait MetricsProvider {
    /// Ascent, descent and leading for `style`.
    fn font_metrics(&self, style: TextStyle) -> ScaledFontMetrics;

    /// Advance width of `text` rendered with `style`.
    fn measure(&self, text: &str, style: TextStyle) -> f32;

    /// Shorten `text` so that it fits into `max_width`.
    ///
    /// Returns `text` unchanged when it already fits, a grapheme prefix
    /// followed by [`ELLIPSIS`] when it does not, or an empty string when
    /// not even the ellipsis fits.
    fn truncate_to_width(&self, text: &str, style: TextStyle, max_width: f32) -> String {
        if self.measure(text, style) <= max_width {
            return text.to_owned();
        }
        let ellipsis_width = self.measure(ELLIPSIS, style);
        if ellipsis_width > max_width {
            return String::new();
        }
        let mut end = 0;
        let mut width = ellipsis_width;
        for (index, grapheme) in text.grapheme_indices(true) {
            let advance = self.measure(grapheme, style);
            if width + advance > max_width {
                break;
            }
            width += advance;
            end = index + grapheme.len();
        }
        let mut out = String::with_capacity(end + ELLIPSIS.len());
        out.push_str(&text[..end]);
        out.push_str(ELLIPSIS);
        out
    }
}

/// Deterministic provider that gives every grapheme the same advance.
///
/// CJK and other fill-script graphemes take two advances. Useful for tests,
/// previews and hosts without a font stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

impl FixedMetrics {
    pub fn new(advance: f32) -> Self {
        Self {
            advance,
            ascent: advance * 0.8,
            descent: advance * 0.2,
            line_gap: 0.0,
        }
    }

    pub fn with_vertical(mut self, ascent: f32, descent: f32, line_gap: f32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self.line_gap = line_gap;
        self
    }
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl MetricsProvider for FixedMetrics {
    fn font_metrics(&self, _style: TextStyle) -> ScaledFontMetrics {
        ScaledFontMetrics::new(self.ascent, self.descent, self.line_gap)
    }

    fn measure(&self, text: &str, _style: TextStyle) -> f32 {
        text.graphemes(true)
            .map(|g| match g.chars().next() {
                Some(c) if needs_fill(c) => self.advance * 2.0,
                _ => self.advance,
            })
            .sum()
    }
}
