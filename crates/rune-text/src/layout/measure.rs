use core::cell::Cell;

use crate::font::{MetricsProvider, TextStyle};
use crate::unicode::classify::is_monospace_range;

/// Width measurement with the cheap paths the line breaker relies on.
///
/// Runs of ASCII spaces cost one space width each, and so does every
/// codepoint of a monospace entity that stays inside the monospace ranges.
/// Single codepoints are cached by the last codepoint measured, which pays
/// off on repeated characters.
pub(crate) struct Measurer<'a> {
    provider: &'a dyn MetricsProvider,
    last: Cell<Option<(char, TextStyle, f32)>>,
}

impl<'a> Measurer<'a> {
    pub fn new(provider: &'a dyn MetricsProvider) -> Self {
        Self {
            provider,
            last: Cell::new(None),
        }
    }

    pub fn provider(&self) -> &'a dyn MetricsProvider {
        self.provider
    }

    pub fn space_width(&self, style: TextStyle) -> f32 {
        self.single(' ', style)
    }

    pub fn measure(&self, text: &str, style: TextStyle) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        if text.bytes().all(|b| b == b' ') {
            return self.space_width(style) * text.len() as f32;
        }
        if style.monospace && text.chars().all(is_monospace_range) {
            return self.space_width(style) * text.chars().count() as f32;
        }
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return self.single(c, style);
        }
        self.provider.measure(text, style)
    }

    fn single(&self, c: char, style: TextStyle) -> f32 {
        if let Some((last, last_style, width)) = self.last.get() {
            if last == c && last_style == style {
                return width;
            }
        }
        let mut buf = [0u8; 4];
        let width = self.provider.measure(c.encode_utf8(&mut buf), style);
        self.last.set(Some((c, style, width)));
        width
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::font::{FixedMetrics, ScaledFontMetrics};

    struct Counting {
        inner: FixedMetrics,
        calls: Cell<usize>,
    }

    impl MetricsProvider for Counting {
        fn font_metrics(&self, style: TextStyle) -> ScaledFontMetrics {
            self.inner.font_metrics(style)
        }

        fn measure(&self, text: &str, style: TextStyle) -> f32 {
            self.calls.set(self.calls.get() + 1);
            self.inner.measure(text, style)
        }
    }

    #[test]
    fn spaces_use_space_width() {
        let provider = Counting {
            inner: FixedMetrics::new(10.0),
            calls: Cell::new(0),
        };
        let measurer = Measurer::new(&provider);
        assert_eq!(measurer.measure("    ", TextStyle::REGULAR), 40.0);
        assert_eq!(measurer.measure("  ", TextStyle::REGULAR), 20.0);
        assert_eq!(provider.calls.get(), 1);
    }

    #[test]
    fn repeated_codepoint_hits_cache() {
        let provider = Counting {
            inner: FixedMetrics::new(10.0),
            calls: Cell::new(0),
        };
        let measurer = Measurer::new(&provider);
        for _ in 0..5 {
            assert_eq!(measurer.measure("m", TextStyle::REGULAR), 10.0);
        }
        assert_eq!(provider.calls.get(), 1);
    }

    #[test]
    fn monospace_counts_codepoints() {
        let provider = FixedMetrics::new(8.0);
        let measurer = Measurer::new(&provider);
        let style = TextStyle {
            monospace: true,
            ..TextStyle::REGULAR
        };
        assert_eq!(measurer.measure("fn main", style), 56.0);
    }
}
