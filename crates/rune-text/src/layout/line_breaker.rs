//! Greedy line breaking over paragraphs, whitespace runs, entity segments
//! and splitter-delimited pieces.
//!
//! The breaker walks the text once. Each paragraph is cut into alternating
//! whitespace and non-whitespace runs, each run into entity segments, and
//! each segment into emoji and break pieces. Pieces are placed left to right;
//! a piece that does not fit starts a new line, and a piece that does not
//! fit even an empty line is split per grapheme.

use core::ops::Range;

use crate::entity::{Entity, EntityCursor};
use crate::font::TextStyle;
use crate::layout::cursor::{LayoutCursor, LayoutStep, LineLimitReached};
use crate::layout::measure::Measurer;
use crate::layout::{LayoutContext, LineBox, Part, PartKind, TextFlags, truncate};
use crate::unicode::classify::{
    find_paragraph_separator, find_space_or_newline, is_layout_space, is_space_separator,
    is_splitter, next_break,
};
use crate::unicode::grapheme_end;

/// Graphemes of trailing punctuation kept with the word before them when a
/// word is split mid-line.
const MAX_ABSORBED_SPLITTERS: usize = 5;

/// Result of one layout pass.
#[derive(Debug, Default)]
pub(crate) struct LayoutOutput {
    pub parts: Vec<Part>,
    pub lines: Vec<LineBox>,
    pub width: f32,
    pub height: f32,
    pub paragraph_count: usize,
    pub ellipsized: bool,
    pub emoji_count: usize,
    pub custom_emoji_count: usize,
}

/// Lay out `ctx.text` into parts and lines.
pub(crate) fn layout(ctx: &LayoutContext<'_>) -> LayoutOutput {
    let breaker = LineBreaker::new(ctx);
    let mut cursor = LayoutCursor::new(ctx.emoji_limit);
    if breaker.run(&mut cursor).is_err() {
        log::trace!("line limit reached after {} lines", cursor.lines.len());
    }
    breaker.finish(cursor)
}

struct LineBreaker<'a> {
    ctx: &'a LayoutContext<'a>,
    measurer: Measurer<'a>,
    base_line_height: f32,
}

impl<'a> LineBreaker<'a> {
    fn new(ctx: &'a LayoutContext<'a>) -> Self {
        Self {
            ctx,
            measurer: Measurer::new(ctx.provider),
            base_line_height: ctx.base_line_height(),
        }
    }

    fn line_max(&self, cur: &LayoutCursor) -> f32 {
        self.ctx.line_max_width(cur.line_index(), cur.y)
    }

    fn run(&self, cur: &mut LayoutCursor) -> LayoutStep {
        let text = self.ctx.text;
        let flags = self.ctx.flags;
        let mut entities = EntityCursor::new(self.ctx.entities);
        let mut index = 0;
        let mut after_separator = false;

        while index < text.len() {
            let separator = if flags.contains(TextFlags::ALWAYS_BREAK) {
                find_space_or_newline(text, index)
            } else {
                find_paragraph_separator(text, index)
            };
            let end = separator.as_ref().map_or(text.len(), |s| s.start);
            if end > index {
                after_separator = false;
            }
            self.process_paragraph(cur, &mut entities, index..end)?;

            let Some(separator) = separator else {
                break;
            };
            let collapse = after_separator && flags.contains(TextFlags::IGNORE_CONTINUOUS_NEWLINES);
            if !collapse {
                if flags.contains(TextFlags::IGNORE_NEWLINES) {
                    self.fold_separator(cur)?;
                } else {
                    self.new_line_or_ellipsis(cur, None, None)?;
                    if &text[separator.clone()] != " " {
                        cur.paragraph_index += 1;
                    }
                }
            }
            after_separator = true;
            index = separator.end;
        }

        // Icons anchored at the very end of the text.
        self.process_entities(cur, &mut entities, text.len()..text.len())?;

        cur.current_width = cur.current_width.max(cur.x);
        if cur.x > 0.0 || cur.lines.is_empty() {
            let line_height = cur.line_height(self.base_line_height);
            cur.add_line(cur.x, line_height);
            cur.y += line_height;
        }
        Ok(())
    }

    /// Lay a paragraph separator out as a space.
    fn fold_separator(&self, cur: &mut LayoutCursor) -> LayoutStep {
        if cur.x == 0.0 || cur.parts.is_empty() {
            return Ok(());
        }
        let space = self.measurer.space_width(self.ctx.style(None));
        if cur.x + space > self.line_max(cur) {
            self.new_line_or_ellipsis(cur, None, None)
        } else {
            cur.x += space;
            Ok(())
        }
    }

    /// Split a paragraph into whitespace and non-whitespace runs.
    fn process_paragraph(
        &self,
        cur: &mut LayoutCursor,
        entities: &mut EntityCursor<'_>,
        range: Range<usize>,
    ) -> LayoutStep {
        let mut run_start = range.start;
        let mut run_is_space = None;
        for (offset, c) in self.ctx.text[range.clone()].char_indices() {
            let is_space = is_layout_space(c);
            let at = range.start + offset;
            if run_is_space.is_some_and(|prev| prev != is_space) {
                self.process_entities(cur, entities, run_start..at)?;
                run_start = at;
            }
            run_is_space = Some(is_space);
        }
        self.process_entities(cur, entities, run_start..range.end)
    }

    /// Split a run at entity boundaries and place inline icons.
    fn process_entities(
        &self,
        cur: &mut LayoutCursor,
        entities: &mut EntityCursor<'_>,
        range: Range<usize>,
    ) -> LayoutStep {
        let end = range.end;
        let mut pos = range.start;
        loop {
            match entities.peek(pos) {
                Some((index, entity)) if entity.is_empty() && entity.start <= end => {
                    if entity.start > pos {
                        self.process_text_or_emoji(cur, pos..entity.start, None)?;
                        pos = entity.start;
                    }
                    entities.advance();
                    self.process_icon(cur, index, entity)?;
                }
                Some((index, entity)) if pos < end && entity.start < end => {
                    if entity.start > pos {
                        self.process_text_or_emoji(cur, pos..entity.start, None)?;
                        pos = entity.start;
                    }
                    let segment_end = entity.end.min(end);
                    self.process_text_or_emoji(cur, pos..segment_end, Some(index))?;
                    pos = segment_end;
                }
                _ => {
                    if pos < end {
                        self.process_text_or_emoji(cur, pos..end, None)?;
                    }
                    return Ok(());
                }
            }
        }
    }

    fn process_text_or_emoji(
        &self,
        cur: &mut LayoutCursor,
        range: Range<usize>,
        entity: Option<usize>,
    ) -> LayoutStep {
        if range.is_empty() {
            return Ok(());
        }
        if self.ctx.entity(entity).is_some_and(Entity::is_custom_emoji) {
            cur.custom_emoji_count += 1;
            return self.process_emoji(cur, range, entity);
        }

        let mut matches = Vec::new();
        self.ctx.emoji.replace_emoji(self.ctx.text, range.clone(), &mut cur.emoji, &mut |_, m| {
            matches.push(m);
            true
        });

        let mut start = range.start;
        for m in matches {
            if m.start > start {
                self.process_splitty(cur, start..m.start, entity)?;
            }
            let next = m.end;
            self.process_emoji(cur, m, entity)?;
            start = next;
        }
        if start < range.end {
            self.process_splitty(cur, start..range.end, entity)?;
        }
        Ok(())
    }

    /// Cut a text segment at break opportunities and place each piece.
    fn process_splitty(
        &self,
        cur: &mut LayoutCursor,
        range: Range<usize>,
        entity: Option<usize>,
    ) -> LayoutStep {
        let text = self.ctx.text;
        if text[range.clone()].chars().all(is_layout_space) {
            return self.place_piece(cur, range, entity);
        }
        let mut start = range.start;
        while start < range.end {
            let end = next_break(text, start..range.end);
            self.place_piece(cur, start..end, entity)?;
            start = end;
        }
        Ok(())
    }

    fn process_emoji(
        &self,
        cur: &mut LayoutCursor,
        range: Range<usize>,
        entity: Option<usize>,
    ) -> LayoutStep {
        cur.merge_candidate = None;
        let size = self.ctx.emoji_size(self.ctx.style(entity));
        let crosses = self.crosses_full_width(cur, entity, false);
        if cur.x > 0.0 && (cur.x + size > self.line_max(cur) || crosses) {
            self.new_line_or_ellipsis(cur, None, entity)?;
        }
        let part = Part::new(PartKind::Emoji, range, cur.line_index(), cur.paragraph_index)
            .at(cur.x, cur.y, size)
            .with_entity(entity);
        cur.parts.push(part);
        if self.is_full_width(entity) {
            cur.full_width_entity = entity;
        }
        cur.x += size;
        Ok(())
    }

    fn process_icon(&self, cur: &mut LayoutCursor, index: usize, entity: &Entity) -> LayoutStep {
        cur.merge_candidate = None;
        let Some(icon) = entity.icon else {
            return Ok(());
        };
        let mut max = self.line_max(cur);
        let crosses = self.crosses_full_width(cur, Some(index), false);
        if cur.x > 0.0 && (cur.x + icon.width > max || crosses) {
            self.new_line_or_ellipsis(cur, None, None)?;
            max = self.line_max(cur);
        }
        let (mut width, mut height) = (icon.width, icon.height);
        if width > max && max > 0.0 {
            height *= max / width;
            width = max;
        }
        let mut part = Part::new(
            PartKind::Icon,
            entity.start..entity.start,
            cur.line_index(),
            cur.paragraph_index,
        )
        .at(cur.x, cur.y, width)
        .with_entity(Some(index));
        part.height = Some(height);
        cur.parts.push(part);
        cur.x += width;
        cur.max_part_height = cur.max_part_height.max(height);
        Ok(())
    }

    /// Place one break piece, splitting it per grapheme when it is wider
    /// than a whole line.
    fn place_piece(
        &self,
        cur: &mut LayoutCursor,
        range: Range<usize>,
        entity: Option<usize>,
    ) -> LayoutStep {
        let text = self.ctx.text;
        let style = self.ctx.style(entity);
        let is_space = text[range.clone()].chars().all(is_layout_space);
        let mut start = range.start;
        while start < range.end {
            let width = self.measurer.measure(&text[start..range.end], style);
            // Whitespace never forces a wrap; it is clamped to the line instead.
            let fit = if is_space { 0.0 } else { width };
            let max = self.line_max(cur);
            if fit <= max {
                return self.commit(cur, start..range.end, width, fit, is_space, entity);
            }
            if cur.x > 0.0 {
                self.new_line_or_ellipsis(cur, Some(start..range.end), entity)?;
                continue;
            }
            let (end, prefix_width) = self.fit_prefix(start..range.end, style, max);
            self.commit(cur, start..end, prefix_width, prefix_width, false, entity)?;
            start = end;
        }
        Ok(())
    }

    /// Longest grapheme prefix of `range` that fits `max`, and its width.
    ///
    /// Always consumes at least one grapheme.
    fn fit_prefix(&self, range: Range<usize>, style: TextStyle, max: f32) -> (usize, f32) {
        let text = self.ctx.text;
        let mut pos = range.start;
        let mut width = 0.0;
        while pos < range.end {
            let unit_end = self.unit_end(pos, range.end);
            let unit_width = self.measurer.measure(&text[pos..unit_end], style);
            if width + unit_width > max {
                if pos == range.start {
                    log::warn!(
                        "grapheme at {pos} is wider ({unit_width}) than the line ({max}); overflowing"
                    );
                    return (unit_end, unit_width);
                }
                break;
            }
            width += unit_width;
            pos = unit_end;
        }
        (pos, width)
    }

    /// End of the grapheme at `pos`, extended over up to a few following
    /// punctuation graphemes so that a split never strands them.
    fn unit_end(&self, pos: usize, end: usize) -> usize {
        let text = self.ctx.text;
        let mut unit_end = grapheme_end(text, pos, end);
        let starts_with_splitter = text[pos..].chars().next().is_some_and(|c| is_splitter(c, true));
        if starts_with_splitter {
            return unit_end;
        }
        for _ in 0..MAX_ABSORBED_SPLITTERS {
            let next_end = grapheme_end(text, unit_end, end);
            if next_end >= end {
                break;
            }
            if !text[unit_end..].chars().next().is_some_and(|c| is_splitter(c, false)) {
                break;
            }
            unit_end = next_end;
        }
        unit_end
    }

    /// Append `range` to the current line, wrapping first when it does not
    /// fit, and merge it into the previous part when possible.
    fn commit(
        &self,
        cur: &mut LayoutCursor,
        range: Range<usize>,
        width: f32,
        fit: f32,
        is_space: bool,
        entity: Option<usize>,
    ) -> LayoutStep {
        let max = self.line_max(cur);
        if cur.x > 0.0 {
            let overflows = cur.x + fit > max;
            if overflows || self.crosses_full_width(cur, entity, is_space) {
                let hoisted = overflows && self.try_hoist(cur, range.start, entity, fit, max)?;
                if !hoisted {
                    self.new_line_or_ellipsis(cur, Some(range.clone()), entity)?;
                }
            }
        }

        let width = if is_space {
            width.min((self.line_max(cur) - cur.x).max(0.0))
        } else {
            width
        };

        let merge_into = cur.merge_candidate.filter(|&i| {
            let last = &cur.parts[i];
            last.entity == entity
                && last.kind == PartKind::Text
                && last.trimmed.is_none()
                && last.range.end == range.start
        });
        match merge_into {
            Some(i) => {
                let last = &mut cur.parts[i];
                last.range.end = range.end;
                last.width += width;
            }
            None => {
                let part = Part::new(PartKind::Text, range, cur.line_index(), cur.paragraph_index)
                    .at(cur.x, cur.y, width)
                    .with_entity(entity);
                cur.parts.push(part);
                cur.merge_candidate = Some(cur.parts.len() - 1);
            }
        }
        if self.is_full_width(entity) {
            cur.full_width_entity = entity;
        }
        cur.x += width;
        Ok(())
    }

    fn is_full_width(&self, entity: Option<usize>) -> bool {
        self.ctx.entity(entity).is_some_and(Entity::is_full_width)
    }

    /// Full-width entities always sit on lines of their own. Whitespace
    /// right after one stays on its line.
    fn crosses_full_width(&self, cur: &LayoutCursor, entity: Option<usize>, is_space: bool) -> bool {
        match cur.full_width_entity {
            Some(block) => Some(block) != entity && !is_space,
            None => self.is_full_width(entity),
        }
    }

    /// Move the previous word to the next line together with the punctuation
    /// that follows it, instead of leaving the punctuation alone at the
    /// start of a line.
    fn try_hoist(
        &self,
        cur: &mut LayoutCursor,
        start: usize,
        entity: Option<usize>,
        fit: f32,
        max: f32,
    ) -> Result<bool, LineLimitReached> {
        let Some(index) = cur.merge_candidate else {
            return Ok(false);
        };
        if self.ctx.max_lines.is_some_and(|max_lines| cur.lines.len() + 1 >= max_lines) {
            return Ok(false);
        }
        let text = self.ctx.text;
        let last = &cur.parts[index];
        let last_text = last.text(text);
        let hoist = last.kind == PartKind::Text
            && last.x != 0.0
            && last.entity != entity
            && cur.x - last.x + fit <= max
            && text[start..].chars().next().is_some_and(|c| is_splitter(c, false))
            && !last_text.chars().next_back().is_some_and(|c| is_splitter(c, true))
            && !last_text.chars().any(is_space_separator);
        if !hoist {
            return Ok(false);
        }

        let (moved_x, moved_width) = (last.x, last.width);
        let line_height = cur.line_height(self.base_line_height);
        let previous_max_part_height = cur.max_part_height;
        cur.add_line(moved_x, line_height);
        cur.current_width = cur.current_width.max(moved_x);
        cur.y += line_height;
        cur.max_part_height = 0.0;

        cur.full_width_entity = None;

        let (line_index, y) = (cur.line_index(), cur.y);
        let moved = &mut cur.parts[index];
        moved.x = 0.0;
        moved.y = y;
        moved.line_index = line_index;
        cur.x = moved_width;

        cur.ensure_line_count(self.ctx.max_lines, line_height, previous_max_part_height)?;
        Ok(true)
    }

    /// Start a new line, or truncate and stop when the line limit is hit.
    ///
    /// `pending` is the text that failed to fit; truncation may fill the
    /// rest of the last line with a prefix of it.
    fn new_line_or_ellipsis(
        &self,
        cur: &mut LayoutCursor,
        pending: Option<Range<usize>>,
        entity: Option<usize>,
    ) -> LayoutStep {
        let (line_height, previous_max_part_height) = cur.break_line(self.base_line_height);
        let step = cur.ensure_line_count(self.ctx.max_lines, line_height, previous_max_part_height);
        if step.is_err() {
            truncate::ellipsize(
                self.ctx,
                &self.measurer,
                cur,
                pending,
                entity,
                self.base_line_height,
            );
        }
        step
    }

    fn finish(&self, mut cur: LayoutCursor) -> LayoutOutput {
        let line_count = cur.parts.last().map_or(1, |p| p.line_index + 1);
        while cur.lines.len() < line_count {
            let line_height = cur.line_height(self.base_line_height);
            cur.add_line(0.0, line_height);
            cur.y += line_height;
        }

        if let Some(suffix) = self.ctx.suffix.filter(|s| !s.is_empty()) {
            self.append_suffix(&mut cur, suffix);
        }

        let height = cur.lines.iter().map(|l| l.height).sum();
        LayoutOutput {
            width: cur.current_width,
            height,
            paragraph_count: cur.paragraph_index + 1,
            ellipsized: cur.ellipsized,
            emoji_count: cur.emoji.accepted(),
            custom_emoji_count: cur.custom_emoji_count,
            parts: cur.parts,
            lines: cur.lines,
        }
    }

    /// The suffix follows the last part; its width was reserved on every
    /// line up front.
    fn append_suffix(&self, cur: &mut LayoutCursor, suffix: &str) {
        let Some(last) = cur.parts.last() else {
            return;
        };
        let (line_index, paragraph_index, y) = (last.line_index, last.paragraph_index, last.y);
        let Some(line) = cur.lines.get_mut(line_index) else {
            return;
        };
        let x = line.width;
        line.width += self.ctx.suffix_width;
        let line_width = line.width;
        cur.parts.push(
            Part::synthetic(suffix, self.ctx.text.len(), line_index, paragraph_index)
                .at(x, y, self.ctx.suffix_width),
        );
        cur.current_width = cur.current_width.max(line_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entities, Entity, EntityFlags};
    use crate::font::FixedMetrics;
    use crate::layout::Dimensions;
    use crate::unicode::{NoEmoji, UnicodeEmojiMatcher};

    fn context<'a>(
        text: &'a str,
        entities: &'a Entities,
        provider: &'a FixedMetrics,
        max_width: f32,
    ) -> LayoutContext<'a> {
        LayoutContext {
            text,
            entities,
            provider,
            emoji: &NoEmoji,
            line_widths: None,
            flags: TextFlags::empty(),
            dimensions: Dimensions::default(),
            max_width,
            max_lines: None,
            suffix: None,
            suffix_width: 0.0,
            emoji_limit: None,
            fake_bold: false,
        }
    }

    fn line_texts(text: &str, out: &LayoutOutput) -> Vec<String> {
        let mut lines = vec![String::new(); out.lines.len()];
        for part in &out.parts {
            lines[part.line_index].push_str(part.text(text));
        }
        lines
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "hello world";
        let out = layout(&context(text, &entities, &provider, 60.0));
        assert_eq!(line_texts(text, &out), vec!["hello ", "world"]);
        assert_eq!(out.lines[0].width, 60.0);
        assert_eq!(out.lines[1].width, 50.0);
        assert_eq!(out.width, 60.0);
    }

    #[test]
    fn trailing_space_is_clamped_to_line() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "hello world";
        let out = layout(&context(text, &entities, &provider, 50.0));
        assert_eq!(line_texts(text, &out), vec!["hello ", "world"]);
        assert_eq!(out.lines[0].width, 50.0);
    }

    #[test]
    fn long_word_is_split_per_grapheme() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "abcdefghijk";
        let out = layout(&context(text, &entities, &provider, 40.0));
        assert_eq!(line_texts(text, &out), vec!["abcd", "efgh", "ijk"]);
    }

    #[test]
    fn unit_absorbs_trailing_punctuation() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "abc!!x";
        let ctx = context(text, &entities, &provider, 40.0);
        let breaker = LineBreaker::new(&ctx);
        assert_eq!(breaker.unit_end(2, text.len()), 5);
        assert_eq!(breaker.unit_end(3, text.len()), 4);
    }

    #[test]
    fn newline_starts_new_paragraph() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "ab\ncd";
        let out = layout(&context(text, &entities, &provider, 100.0));
        assert_eq!(line_texts(text, &out), vec!["ab", "cd"]);
        assert_eq!(out.paragraph_count, 2);
        assert_eq!(out.parts[1].paragraph_index, 1);
    }

    #[test]
    fn entity_boundaries_split_parts() {
        let provider = FixedMetrics::new(10.0);
        let text = "plain bold";
        let entities = Entities::new(vec![Entity::new(6..10).bold()], text).unwrap();
        let out = layout(&context(text, &entities, &provider, 200.0));
        assert_eq!(out.parts.len(), 2);
        assert_eq!(out.parts[0].range, 0..6);
        assert_eq!(out.parts[1].range, 6..10);
        assert_eq!(out.parts[1].entity, Some(0));
        assert_eq!(out.parts[1].x, 60.0);
    }

    #[test]
    fn icon_becomes_its_own_part() {
        let provider = FixedMetrics::new(10.0);
        let text = "ab";
        let entities = Entities::new(vec![Entity::icon(1, 24.0, 24.0)], text).unwrap();
        let out = layout(&context(text, &entities, &provider, 200.0));
        let kinds: Vec<_> = out.parts.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PartKind::Text, PartKind::Icon, PartKind::Text]);
        assert_eq!(out.parts[1].x, 10.0);
        assert_eq!(out.parts[2].x, 34.0);
        assert_eq!(out.lines[0].height, 24.0);
    }

    #[test]
    fn emoji_is_sized_by_glyph_height() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "a\u{1F600}";
        let mut ctx = context(text, &entities, &provider, 200.0);
        ctx.emoji = &UnicodeEmojiMatcher;
        let out = layout(&ctx);
        assert_eq!(out.parts.len(), 2);
        assert_eq!(out.parts[1].kind, PartKind::Emoji);
        // glyph height 10 plus 2 of padding
        assert_eq!(out.parts[1].width, 12.0);
        assert_eq!(out.emoji_count, 1);
    }

    #[test]
    fn punctuation_pulls_previous_word_along() {
        let provider = FixedMetrics::new(10.0);
        let text = "see link, ok";
        let entities = Entities::new(vec![Entity::new(4..8).clickable(1)], text).unwrap();
        let out = layout(&context(text, &entities, &provider, 80.0));
        assert_eq!(line_texts(text, &out), vec!["see ", "link, ok"]);
    }

    #[test]
    fn suffix_follows_last_part() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "ab";
        let mut ctx = context(text, &entities, &provider, 100.0);
        ctx.suffix = Some(" 12:00");
        ctx.suffix_width = 60.0;
        let out = layout(&ctx);
        let suffix = out.parts.last().unwrap();
        assert_eq!(suffix.text(text), " 12:00");
        assert_eq!(suffix.x, 20.0);
        assert_eq!(out.lines[0].width, 80.0);
    }

    #[test]
    fn full_width_entity_sits_on_its_own_line() {
        let provider = FixedMetrics::new(10.0);
        let text = "see code here";
        let entities = Entities::new(
            vec![Entity::new(4..8).with_flags(EntityFlags::FULL_WIDTH)],
            text,
        )
        .unwrap();
        let out = layout(&context(text, &entities, &provider, 200.0));
        assert_eq!(line_texts(text, &out), vec!["see ", "code ", "here"]);
        assert_eq!(out.parts.last().map(|p| p.x), Some(0.0));
    }

    #[test]
    fn always_break_ends_lines_at_spaces() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "ab cd ef";
        let mut ctx = context(text, &entities, &provider, 200.0);
        ctx.flags = TextFlags::ALWAYS_BREAK;
        let out = layout(&ctx);
        assert_eq!(line_texts(text, &out), vec!["ab", "cd", "ef"]);
        assert_eq!(out.paragraph_count, 1);
    }

    #[test]
    fn custom_emoji_entity_is_one_emoji_part() {
        let provider = FixedMetrics::new(10.0);
        let text = "hi :party:";
        let entities = Entities::new(
            vec![Entity::new(3..10).with_flags(EntityFlags::CUSTOM_EMOJI)],
            text,
        )
        .unwrap();
        let out = layout(&context(text, &entities, &provider, 200.0));
        assert_eq!(out.parts.len(), 2);
        let emoji = &out.parts[1];
        assert_eq!(emoji.kind, PartKind::Emoji);
        assert_eq!(emoji.range, 3..10);
        assert_eq!(emoji.width, 12.0);
        assert_eq!(out.custom_emoji_count, 1);
        assert_eq!(out.emoji_count, 0);
    }

    #[test]
    fn emoji_past_the_limit_are_laid_out_as_text() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "\u{1F600}\u{1F601}\u{1F602}";
        let mut ctx = context(text, &entities, &provider, 200.0);
        ctx.emoji = &UnicodeEmojiMatcher;
        ctx.emoji_limit = Some(1);
        let out = layout(&ctx);
        let kinds: Vec<_> = out.parts.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PartKind::Emoji, PartKind::Text]);
        assert_eq!(out.parts[1].range, 4..12);
        assert_eq!(out.emoji_count, 1);
    }
}
