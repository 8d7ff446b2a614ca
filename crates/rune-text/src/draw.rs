//! Rendering through a host-provided [`Surface`].

use crate::entity::{Entity, EntityFlags, HighlightKey};
use crate::font::TextStyle;
use crate::layout::{DrawOrigin, PartKind, Rect, Text, TextFlags};
use crate::region::RoundRect;

/// ARGB color.
pub type Color = u32;

/// Theme lookups. Entities carry color ids; the host maps them to colors.
pub trait ColorSet {
    fn text_color(&self, entity: Option<&Entity>) -> Color;
    fn background_color(&self, key: HighlightKey) -> Color;
    /// Outline around backgrounds; `None` draws no outline.
    fn outline_color(&self, _key: HighlightKey) -> Option<Color> {
        None
    }
    fn press_color(&self, entity: Option<&Entity>) -> Color;
    fn spoiler_color(&self) -> Color;
}

/// One merged text run ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub x: f32,
    pub baseline_y: f32,
    pub width: f32,
    pub style: TextStyle,
    pub color: Color,
    pub alpha: f32,
    pub rtl: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

/// Drawing backend.
pub trait Surface {
    fn clip(&mut self, rect: Rect);
    fn fill_round_rect(&mut self, rect: &RoundRect, color: Color, alpha: f32);
    fn stroke_round_rect(&mut self, rect: &RoundRect, color: Color, width: f32, alpha: f32);
    fn draw_text(&mut self, run: &TextRun<'_>);
    fn draw_emoji(&mut self, emoji: &str, rect: Rect, alpha: f32);
    /// Icon for the entity at `entity_index`.
    fn draw_icon(&mut self, entity_index: usize, rect: Rect, alpha: f32);
}

impl Text {
    /// Draw the text at `origin`.
    ///
    /// Order: clip, backgrounds, press highlight, spoiler covers, then the
    /// parts. Adjacent mergeable parts go out as one text run.
    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        origin: DrawOrigin,
        colors: &dyn ColorSet,
        alpha: f32,
    ) {
        if self.parts().is_empty() {
            return;
        }
        let dy = origin.start_y;
        let dimensions = *self.dimensions();

        if self.flags().contains(TextFlags::NEED_CLIP_TEXT_AREA) {
            let pad = dimensions.clip_padding;
            surface.clip(Rect::new(
                origin.start_x - pad,
                origin.start_y - pad,
                origin.start_x + self.max_width().max(self.width()) + pad,
                origin.start_y + self.height() + pad,
            ));
        }

        for region in self.background_regions(origin) {
            let color = colors.background_color(region.key);
            let outline = colors.outline_color(region.key);
            for rect in &region.rects {
                let rect = shifted(rect, dy);
                surface.fill_round_rect(&rect, color, alpha);
                if let Some(outline) = outline {
                    surface.stroke_round_rect(&rect, outline, dimensions.outline_width, alpha);
                }
            }
        }

        let pressed_entity = self
            .pressed_range()
            .and_then(|r| self.parts().get(r.start))
            .and_then(|p| p.entity);
        if let Some(rects) = self.press_highlight(origin).map(<[RoundRect]>::to_vec) {
            let color = colors.press_color(pressed_entity.and_then(|i| self.entities().get(i)));
            for rect in &rects {
                surface.fill_round_rect(&shifted(rect, dy), color, alpha);
            }
        }

        let spoiler_color = colors.spoiler_color();
        for region in self.spoiler_regions(origin) {
            let cover = region.alpha();
            if cover <= 0.0 {
                continue;
            }
            for rect in &region.rects {
                surface.fill_round_rect(&shifted(rect, dy), spoiler_color, alpha * cover);
            }
        }

        self.draw_parts(surface, origin, colors, alpha);
    }

    fn draw_parts(
        &self,
        surface: &mut dyn Surface,
        origin: DrawOrigin,
        colors: &dyn ColorSet,
        alpha: f32,
    ) {
        let geometry = self.geometry(origin);
        let parts = self.parts();
        let ascent = self.ascent();
        let mut index = 0;
        while index < parts.len() {
            let part = &parts[index];
            let mut end = index + 1;
            if part.kind == PartKind::Text {
                while end < parts.len() && parts[end - 1].would_merge_with_next(&parts[end]) {
                    end += 1;
                }
            }

            let part_alpha = alpha
                * self
                    .regions
                    .spoiler_for_part(index)
                    .map_or(1.0, |s| s.reveal_progress.clamp(0.0, 1.0));
            let rect = parts[index..end]
                .iter()
                .map(|p| geometry.part_rect(p))
                .reduce(|a, b| a.union(&b))
                .unwrap_or_default();
            let entity = self.entity_of(part);

            if part_alpha > 0.0 {
                match part.kind {
                    PartKind::Emoji => surface.draw_emoji(part.text(self.source()), rect, part_alpha),
                    PartKind::Icon => {
                        if let Some(entity_index) = part.entity {
                            surface.draw_icon(entity_index, rect, part_alpha);
                        }
                    }
                    PartKind::Text => {
                        let text = match end - index {
                            1 => part.text(self.source()),
                            _ => &self.source()[part.range.start..parts[end - 1].range.end],
                        };
                        if !text.is_empty() {
                            let flags = entity.map_or(EntityFlags::empty(), |e| e.flags);
                            surface.draw_text(&TextRun {
                                text,
                                x: rect.left,
                                baseline_y: rect.top + ascent,
                                width: rect.width(),
                                style: self.part_style(part),
                                color: colors.text_color(entity),
                                alpha: part_alpha,
                                rtl: part.rtl,
                                underline: flags.contains(EntityFlags::UNDERLINE),
                                strikethrough: flags.contains(EntityFlags::STRIKETHROUGH),
                            });
                        }
                    }
                }
            }
            index = end;
        }
    }
}

fn shifted(rect: &RoundRect, dy: f32) -> RoundRect {
    RoundRect {
        rect: rect.rect.offset(0.0, dy),
        radius: rect.radius,
    }
}
