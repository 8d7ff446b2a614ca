use core::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bidi;
use crate::entity::{Entities, Entity, SpoilerSpan};
use crate::error::LayoutError;
use crate::font::{MetricsProvider, TextStyle};
use crate::layout::hit_test::Geometry;
use crate::layout::line_breaker::{self, LayoutOutput};
use crate::layout::{
    Dimensions, DrawOrigin, LayoutContext, LineBox, LineWidthProvider, Part, PartKind, Point, Rect,
    TextFlags, base_line_height, style_for,
};
use crate::region::RegionCache;
use crate::touch::{ClickCallback, PressState};
use crate::unicode::classify::text_needs_fake_bold;
use crate::unicode::{EmojiMatcher, UnicodeEmojiMatcher};

/// Layouts slower than this are logged at `warn`.
pub const DEFAULT_SLOW_LAYOUT_THRESHOLD: Duration = Duration::from_millis(150);

/// What a host has to refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Invalidation {
    /// Parts and size were recomputed.
    Layout { width: f32, height: f32 },
    /// Only press or reveal state changed.
    Redraw,
}

/// Configures and creates a [`Text`].
pub struct TextBuilder {
    provider: Arc<dyn MetricsProvider>,
    emoji: Arc<dyn EmojiMatcher>,
    line_widths: Option<Arc<dyn LineWidthProvider>>,
    flags: TextFlags,
    dimensions: Dimensions,
    max_lines: Option<usize>,
    suffix: Option<String>,
    emoji_limit: Option<usize>,
    slow_layout_threshold: Duration,
}

impl TextBuilder {
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        Self {
            provider,
            emoji: Arc::new(UnicodeEmojiMatcher),
            line_widths: None,
            flags: TextFlags::empty(),
            dimensions: Dimensions::default(),
            max_lines: None,
            suffix: None,
            emoji_limit: None,
            slow_layout_threshold: DEFAULT_SLOW_LAYOUT_THRESHOLD,
        }
    }

    pub fn flags(mut self, flags: TextFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn emoji_matcher(mut self, emoji: Arc<dyn EmojiMatcher>) -> Self {
        self.emoji = emoji;
        self
    }

    /// Stop recognizing emoji after `limit` matches.
    pub fn emoji_limit(mut self, limit: usize) -> Self {
        self.emoji_limit = Some(limit);
        self
    }

    pub fn line_width_provider(mut self, provider: Arc<dyn LineWidthProvider>) -> Self {
        self.line_widths = Some(provider);
        self
    }

    pub fn slow_layout_threshold(mut self, threshold: Duration) -> Self {
        self.slow_layout_threshold = threshold;
        self
    }

    pub fn build(self) -> Result<Text, LayoutError> {
        if self.max_lines == Some(0) {
            return Err(LayoutError::ZeroMaxLines);
        }
        Ok(Text {
            source: String::new(),
            entities: Entities::empty(),
            provider: self.provider,
            emoji: self.emoji,
            line_widths: self.line_widths,
            flags: self.flags,
            dimensions: self.dimensions,
            max_lines: self.max_lines,
            suffix: self.suffix,
            emoji_limit: self.emoji_limit,
            slow_layout_threshold: self.slow_layout_threshold,
            max_width: 0.0,
            fake_bold: false,
            output: LayoutOutput::default(),
            fully_rtl: false,
            may_apply_rtl: false,
            has_media: false,
            generation: 0,
            regions: RegionCache::default(),
            press: None,
            click: None,
            on_invalidate: None,
        })
    }
}

/// A laid-out rich text: the source, its entities and the resulting parts.
///
/// [`Text::set`] recomputes everything synchronously. Regions, press
/// highlights and hit tests are derived lazily from the parts and the draw
/// origin they are requested for.
pub struct Text {
    source: String,
    entities: Entities,
    provider: Arc<dyn MetricsProvider>,
    emoji: Arc<dyn EmojiMatcher>,
    line_widths: Option<Arc<dyn LineWidthProvider>>,
    flags: TextFlags,
    dimensions: Dimensions,
    max_lines: Option<usize>,
    suffix: Option<String>,
    emoji_limit: Option<usize>,
    slow_layout_threshold: Duration,
    max_width: f32,
    /// The source contains a script without a real bold face.
    fake_bold: bool,
    output: LayoutOutput,
    fully_rtl: bool,
    may_apply_rtl: bool,
    has_media: bool,
    generation: u64,
    pub(crate) regions: RegionCache,
    pub(crate) press: Option<PressState>,
    pub(crate) click: Option<Box<dyn ClickCallback>>,
    on_invalidate: Option<Box<dyn FnMut(Invalidation)>>,
}

impl Text {
    /// Replace the text and its entities and lay it out for `max_width`.
    ///
    /// Invalid entities abort the update and leave the previous layout in
    /// place.
    pub fn set(
        &mut self,
        max_width: f32,
        text: impl Into<String>,
        entities: Vec<Entity>,
    ) -> Result<(), LayoutError> {
        let text = text.into();
        let entities = Entities::new(entities, &text)?;
        self.fake_bold = text_needs_fake_bold(&text);
        self.source = text;
        self.entities = entities;
        self.max_width = max_width;
        self.regions.invalidate(true);
        self.relayout();
        Ok(())
    }

    /// Replace the text without entities.
    pub fn set_text(&mut self, max_width: f32, text: impl Into<String>) {
        self.source = text.into();
        self.fake_bold = text_needs_fake_bold(&self.source);
        self.entities = Entities::empty();
        self.max_width = max_width;
        self.regions.invalidate(true);
        self.relayout();
    }

    /// Lay the current text out again for a new width.
    pub fn change_max_width(&mut self, max_width: f32) {
        if max_width == self.max_width {
            return;
        }
        self.max_width = max_width;
        self.relayout();
    }

    pub fn set_invalidation_callback(&mut self, callback: impl FnMut(Invalidation) + 'static) {
        self.on_invalidate = Some(Box::new(callback));
    }

    fn relayout(&mut self) {
        let started = Instant::now();
        self.press = None;
        self.regions.invalidate(false);
        self.generation += 1;

        let output = if self.max_width > 0.0 {
            let style = style_for(&self.entities, None, self.flags, self.fake_bold);
            let suffix_width = self
                .suffix
                .as_deref()
                .map_or(0.0, |s| self.provider.measure(s, style));
            let ctx = LayoutContext {
                text: &self.source,
                entities: &self.entities,
                provider: self.provider.as_ref(),
                emoji: self.emoji.as_ref(),
                line_widths: self.line_widths.as_deref(),
                flags: self.flags,
                dimensions: self.dimensions,
                max_width: self.max_width,
                max_lines: self.max_lines,
                suffix: self.suffix.as_deref(),
                suffix_width,
                emoji_limit: self.emoji_limit,
                fake_bold: self.fake_bold,
            };
            line_breaker::layout(&ctx)
        } else {
            LayoutOutput::default()
        };
        self.output = output;

        let summary = bidi::resolve(&self.source, &self.entities, &mut self.output.parts);
        self.fully_rtl = summary.fully_rtl;
        self.may_apply_rtl = summary.may_apply_rtl;
        self.has_media = self.output.parts.iter().any(Part::is_icon);

        let elapsed = started.elapsed();
        if elapsed > self.slow_layout_threshold {
            log::warn!(
                "slow layout: {elapsed:?} for {} bytes, {} entities, max width {}",
                self.source.len(),
                self.entities.len(),
                self.max_width
            );
        } else {
            log::debug!(
                "layout: {elapsed:?}, {} parts on {} lines, {}x{}",
                self.output.parts.len(),
                self.output.lines.len(),
                self.output.width,
                self.output.height
            );
        }

        let (width, height) = (self.output.width, self.output.height);
        self.notify(Invalidation::Layout { width, height });
    }

    pub(crate) fn notify(&mut self, invalidation: Invalidation) {
        if let Some(callback) = self.on_invalidate.as_mut() {
            callback(invalidation);
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn flags(&self) -> TextFlags {
        self.flags
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn max_lines(&self) -> Option<usize> {
        self.max_lines
    }

    pub fn parts(&self) -> &[Part] {
        &self.output.parts
    }

    pub fn lines(&self) -> &[LineBox] {
        &self.output.lines
    }

    /// Widest line, suffix included.
    pub fn width(&self) -> f32 {
        self.output.width
    }

    pub fn height(&self) -> f32 {
        self.output.height
    }

    pub fn line_count(&self) -> usize {
        self.output.lines.len()
    }

    pub fn paragraph_count(&self) -> usize {
        self.output.paragraph_count
    }

    pub fn is_ellipsized(&self) -> bool {
        self.output.ellipsized
    }

    pub fn is_fully_rtl(&self) -> bool {
        self.fully_rtl
    }

    pub fn may_apply_rtl(&self) -> bool {
        self.may_apply_rtl
    }

    pub fn has_media(&self) -> bool {
        self.has_media
    }

    pub fn emoji_count(&self) -> usize {
        self.output.emoji_count
    }

    pub fn custom_emoji_count(&self) -> usize {
        self.output.custom_emoji_count
    }

    /// Number of emoji when the text consists of emoji and whitespace only,
    /// zero otherwise.
    pub fn emoji_only_count(&self) -> usize {
        let parts = &self.output.parts;
        let only_emoji = !parts.is_empty()
            && parts
                .iter()
                .all(|p| p.is_emoji() || p.is_whitespace(&self.source));
        if only_emoji {
            parts.iter().filter(|p| p.is_emoji()).count()
        } else {
            0
        }
    }

    /// Text drawn on `line_index`.
    pub fn line_text(&self, line_index: usize) -> String {
        self.output
            .parts
            .iter()
            .filter(|p| p.line_index == line_index)
            .map(|p| p.text(&self.source))
            .collect()
    }

    /// Line on which the anchor entity named `name` lands.
    pub fn find_anchor_line_index(&self, name: &str) -> Option<usize> {
        let offset = self.entities.find_anchor(name)?.start;
        let parts = &self.output.parts;
        parts
            .iter()
            .find(|p| !p.is_synthetic() && (p.range.end > offset || p.range.start >= offset))
            .or_else(|| parts.last())
            .map(|p| p.line_index)
    }

    pub(crate) fn base_line_height(&self) -> f32 {
        base_line_height(self.provider.as_ref(), self.flags, &self.dimensions)
    }

    pub(crate) fn part_style(&self, part: &Part) -> TextStyle {
        style_for(&self.entities, part.entity, self.flags, self.fake_bold)
    }

    pub(crate) fn ascent(&self) -> f32 {
        self.provider.font_metrics(TextStyle::REGULAR).ascent
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn geometry(&self, origin: DrawOrigin) -> Geometry<'_> {
        Geometry {
            lines: &self.output.lines,
            entities: &self.entities,
            origin,
            max_width: self.max_width,
            text_width: self.output.width,
            base_line_height: self.base_line_height(),
            ascent: self.ascent(),
            align_center: self.flags.contains(TextFlags::ALIGN_CENTER),
            has_media: self.has_media,
        }
    }

    pub fn entity_of(&self, part: &Part) -> Option<&Entity> {
        part.entity.and_then(|i| self.entities.get(i))
    }

    /// Draw-time rectangle of part `index`.
    pub fn part_rect(&self, index: usize, origin: DrawOrigin) -> Option<Rect> {
        let part = self.output.parts.get(index)?;
        Some(self.geometry(origin).part_rect(part))
    }

    /// Part is a press target on its own: clickable, or still hidden by a
    /// spoiler.
    pub(crate) fn is_priority_target(&self, part: &Part) -> bool {
        let Some(entity) = self.entity_of(part) else {
            return false;
        };
        entity.is_clickable() || entity.spoiler.is_some_and(|span| !self.is_revealed(span))
    }

    pub(crate) fn is_revealed(&self, span: SpoilerSpan) -> bool {
        self.regions.reveal_progress(span) >= 1.0
    }

    /// Resolve the part under `point` when drawn at `origin`.
    pub fn find_part(&self, point: Point, origin: DrawOrigin, only_clickable: bool) -> Option<usize> {
        let geometry = self.geometry(origin);
        geometry.find(
            &self.output.parts,
            point,
            self.dimensions.touch_padding,
            only_clickable,
            |part| self.is_priority_target(part),
        )
    }

    /// Parts that highlight together with part `index` on press: the
    /// neighbours whose entities share its click key.
    pub fn press_range(&self, index: usize) -> Range<usize> {
        let parts = &self.output.parts;
        let Some(entity) = parts.get(index).and_then(|p| self.entity_of(p)) else {
            return index..(index + 1).min(parts.len());
        };
        let same = |i: usize| self.entity_of(&parts[i]).is_some_and(|e| e.same_press_highlight(entity));
        let mut start = index;
        while start > 0 && same(start - 1) {
            start -= 1;
        }
        let mut end = index + 1;
        while end < parts.len() && same(end) {
            end += 1;
        }
        start..end
    }

    /// Bounds of the press-highlight run containing part `index`.
    pub fn locate_part(&self, index: usize, origin: DrawOrigin) -> Option<Rect> {
        let geometry = self.geometry(origin);
        let parts = &self.output.parts;
        parts.get(index)?;
        self.press_range(index)
            .map(|i| geometry.part_rect(&parts[i]))
            .reduce(|a, b| a.union(&b))
    }

    /// Emoji and icon parts, for hosts that load their images.
    pub fn media_parts(&self) -> impl Iterator<Item = (usize, &Part)> {
        self.output
            .parts
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind != PartKind::Text)
    }
}

impl core::fmt::Debug for Text {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Text")
            .field("source", &self.source)
            .field("flags", &self.flags)
            .field("max_width", &self.max_width)
            .field("max_lines", &self.max_lines)
            .field("parts", &self.output.parts.len())
            .field("lines", &self.output.lines.len())
            .finish_non_exhaustive()
    }
}
