pub mod cursor;
pub mod line_box;
pub mod line_breaker;
pub mod measure;
pub mod part;
pub mod text_layout;
pub mod truncate;

pub use hit_test::{DrawOrigin, Point, Rect};
pub use line_box::LineBox;
pub use part::{Part, PartKind};
pub use text_layout::{Text, TextBuilder};

use bitflags::bitflags;

use crate::entity::{Entities, Entity};
use crate::font::{MetricsProvider, TextStyle};
use crate::unicode::EmojiMatcher;

bitflags! {
    /// Behavior switches for a [`Text`].
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TextFlags: u32 {
        /// Center every line inside the maximum width.
        const ALIGN_CENTER               = 1 << 0;
        /// Measure and draw everything bold.
        const ALL_BOLD                   = 1 << 1;
        /// Article typography: wider line spacing.
        const ARTICLE                    = 1 << 2;
        /// No extra spacing between lines.
        const NO_SPACING                 = 1 << 3;
        /// Truncation only appends an ellipsis and never fills the rest of
        /// the line with the text that did not fit.
        const ELLIPSIZE_NO_FILL          = 1 << 4;
        /// Truncation may move the ellipsis onto one extra line.
        const ELLIPSIZE_NEWLINE          = 1 << 5;
        /// Runs of paragraph separators count as one.
        const IGNORE_CONTINUOUS_NEWLINES = 1 << 6;
        /// Paragraph separators are laid out as spaces.
        const IGNORE_NEWLINES            = 1 << 7;
        /// Every part is a press target, not only clickable entities.
        const ALL_CLICKABLE              = 1 << 8;
        /// Touch handling is disabled.
        const NO_CLICKABLE               = 1 << 9;
        /// Every ASCII space is a hard line break.
        const ALWAYS_BREAK               = 1 << 10;
        /// Clip drawing to the text bounds.
        const NEED_CLIP_TEXT_AREA        = 1 << 11;
    }
}

/// Density-scaled constants used by layout, drawing and touch handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub density: f32,
    pub line_spacing: f32,
    pub article_line_spacing: f32,
    /// Added to the glyph height to size emoji.
    pub emoji_padding: f32,
    /// Tolerance margin around parts for touch hits.
    pub touch_padding: f32,
    /// Movement that cancels a press.
    pub touch_slop: f32,
    /// Inset of spoiler covers around their parts.
    pub spoiler_inset: f32,
    /// Inset of background and press highlights around their parts.
    pub highlight_padding: f32,
    pub corner_radius: f32,
    pub outline_width: f32,
    pub clip_padding: f32,
}

impl Dimensions {
    pub fn from_density(density: f32) -> Self {
        let dp = |v: f32| v * density;
        Self {
            density,
            line_spacing: dp(2.0),
            article_line_spacing: dp(3.0),
            emoji_padding: dp(2.0),
            touch_padding: dp(4.0),
            touch_slop: dp(8.0),
            spoiler_inset: dp(1.0),
            highlight_padding: dp(2.0),
            corner_radius: dp(3.0),
            outline_width: dp(1.0),
            clip_padding: dp(4.0),
        }
    }

    pub fn dp(&self, value: f32) -> f32 {
        value * self.density
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::from_density(1.0)
    }
}

/// Per-line available width, e.g. to flow text around a floating avatar.
pub trait LineWidthProvider {
    /// Width available to line `line_index` whose top is at `y`.
    fn line_width(&self, line_index: usize, y: f32, max_width: f32, line_height: f32) -> f32;
}

/// Everything a layout pass reads. Parts refer back into it by index.
pub(crate) struct LayoutContext<'a> {
    pub text: &'a str,
    pub entities: &'a Entities,
    pub provider: &'a dyn MetricsProvider,
    pub emoji: &'a dyn EmojiMatcher,
    pub line_widths: Option<&'a dyn LineWidthProvider>,
    pub flags: TextFlags,
    pub dimensions: Dimensions,
    pub max_width: f32,
    pub max_lines: Option<usize>,
    pub suffix: Option<&'a str>,
    pub suffix_width: f32,
    pub emoji_limit: Option<usize>,
    /// The whole text contains a script without a real bold face. Only
    /// consulted for plain runs under [`TextFlags::ALL_BOLD`].
    pub fake_bold: bool,
}

impl<'a> LayoutContext<'a> {
    pub fn entity(&self, index: Option<usize>) -> Option<&'a Entity> {
        index.and_then(|i| self.entities.get(i))
    }

    pub fn style(&self, entity: Option<usize>) -> TextStyle {
        style_for(self.entities, entity, self.flags, self.fake_bold)
    }

    pub fn base_line_height(&self) -> f32 {
        base_line_height(self.provider, self.flags, &self.dimensions)
    }

    pub fn line_max_width(&self, line_index: usize, y: f32) -> f32 {
        let width = match self.line_widths {
            Some(provider) => {
                provider.line_width(line_index, y, self.max_width, self.base_line_height())
            }
            None => self.max_width,
        };
        width - self.suffix_width
    }

    pub fn emoji_size(&self, style: TextStyle) -> f32 {
        self.provider.font_metrics(style).glyph_height() + self.dimensions.emoji_padding
    }
}

pub(crate) fn style_for(
    entities: &Entities,
    entity: Option<usize>,
    flags: TextFlags,
    text_fake_bold: bool,
) -> TextStyle {
    let force_bold = flags.contains(TextFlags::ALL_BOLD);
    match entity.and_then(|i| Some((i, entities.get(i)?))) {
        Some((index, entity)) => {
            let mut style = entity.style(force_bold);
            style.fake_bold = style.bold && entities.needs_fake_bold(index);
            style
        }
        None => TextStyle {
            bold: force_bold,
            fake_bold: force_bold && text_fake_bold,
            ..TextStyle::REGULAR
        },
    }
}

pub(crate) fn base_line_height(
    provider: &dyn MetricsProvider,
    flags: TextFlags,
    dimensions: &Dimensions,
) -> f32 {
    let spacing = if flags.contains(TextFlags::NO_SPACING) {
        0.0
    } else if flags.contains(TextFlags::ARTICLE) {
        dimensions.article_line_spacing
    } else {
        dimensions.line_spacing
    };
    provider.font_metrics(TextStyle::REGULAR).line_height() + spacing
}
