//! Style entities: externally supplied ranges carrying the attributes the
//! layout engine cares about.

use core::ops::Range;

use bitflags::bitflags;

use crate::error::EntityError;
use crate::font::TextStyle;
use crate::unicode::classify::text_needs_fake_bold;

bitflags! {
    /// Boolean attributes of an [`Entity`].
    #[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u32 {
        const BOLD          = 1 << 0;
        const ITALIC        = 1 << 1;
        const UNDERLINE     = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const MONOSPACE     = 1 << 4;
        /// Block-level run (e.g. pre-formatted code) that never shares a
        /// line with a different entity.
        const FULL_WIDTH    = 1 << 5;
        const CLICKABLE     = 1 << 6;
        /// Bare links, mentions and similar runs that do not say anything
        /// about the direction of the surrounding text.
        const NON_ESSENTIAL = 1 << 7;
        /// The whole range renders as one custom emoji.
        const CUSTOM_EMOJI  = 1 << 8;
    }
}

/// Pixel size of an inline icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconSize {
    pub width: f32,
    pub height: f32,
}

/// Identity of a spoiler: the range of the spoiler markup that produced the
/// entity. Entities cut from one spoiler share the same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpoilerSpan {
    pub offset: usize,
    pub length: usize,
}

impl SpoilerSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Color ids for a background highlight. Parts sharing a key are batched
/// into one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightKey {
    pub background: u32,
    pub outline: u32,
}

/// One style range over the source text, in byte offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    pub flags: EntityFlags,
    /// Zero-length entities with an icon render as a fixed-size inline box.
    pub icon: Option<IconSize>,
    pub spoiler: Option<SpoilerSpan>,
    /// Fraction of the font ascent to raise (positive) or lower the run by.
    pub baseline_shift: f32,
    /// Parts whose entities share a click key highlight together on press.
    pub click_key: Option<u64>,
    pub highlight: Option<HighlightKey>,
    /// Color id resolved by the host's color set.
    pub color_id: Option<u32>,
    /// Name for anchor lookups.
    pub anchor: Option<String>,
}

impl Entity {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            flags: EntityFlags::empty(),
            icon: None,
            spoiler: None,
            baseline_shift: 0.0,
            click_key: None,
            highlight: None,
            color_id: None,
            anchor: None,
        }
    }

    /// Zero-length inline icon at `offset`.
    pub fn icon(offset: usize, width: f32, height: f32) -> Self {
        Self {
            icon: Some(IconSize { width, height }),
            ..Self::new(offset..offset)
        }
    }

    /// Zero-length named anchor at `offset`.
    pub fn anchor(offset: usize, name: impl Into<String>) -> Self {
        Self {
            anchor: Some(name.into()),
            ..Self::new(offset..offset)
        }
    }

    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn bold(self) -> Self {
        self.with_flags(EntityFlags::BOLD)
    }

    pub fn italic(self) -> Self {
        self.with_flags(EntityFlags::ITALIC)
    }

    pub fn monospace(self) -> Self {
        self.with_flags(EntityFlags::MONOSPACE)
    }

    pub fn clickable(mut self, key: u64) -> Self {
        self.flags |= EntityFlags::CLICKABLE;
        self.click_key = Some(key);
        self
    }

    pub fn with_spoiler(mut self, span: SpoilerSpan) -> Self {
        self.spoiler = Some(span);
        self
    }

    pub fn with_highlight(mut self, key: HighlightKey) -> Self {
        self.highlight = Some(key);
        self
    }

    pub fn with_baseline_shift(mut self, shift: f32) -> Self {
        self.baseline_shift = shift;
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_icon(&self) -> bool {
        self.icon.is_some()
    }

    /// Zero-length entity without an icon; ignored by layout.
    pub fn is_anchor(&self) -> bool {
        self.is_empty() && !self.is_icon()
    }

    pub fn is_bold(&self) -> bool {
        self.flags.contains(EntityFlags::BOLD)
    }

    pub fn is_monospace(&self) -> bool {
        self.flags.contains(EntityFlags::MONOSPACE)
    }

    pub fn is_full_width(&self) -> bool {
        self.flags.contains(EntityFlags::FULL_WIDTH)
    }

    pub fn is_clickable(&self) -> bool {
        self.flags.contains(EntityFlags::CLICKABLE)
    }

    pub fn is_custom_emoji(&self) -> bool {
        self.flags.contains(EntityFlags::CUSTOM_EMOJI)
    }

    pub fn is_essential(&self) -> bool {
        !self.flags.contains(EntityFlags::NON_ESSENTIAL)
    }

    /// Measurement style for runs covered by this entity.
    pub fn style(&self, force_bold: bool) -> TextStyle {
        TextStyle {
            bold: force_bold || self.is_bold(),
            italic: self.flags.contains(EntityFlags::ITALIC),
            monospace: self.is_monospace(),
            fake_bold: false,
        }
    }

    /// Same press-highlight group: both clickable with the same click key.
    pub fn same_press_highlight(&self, other: &Entity) -> bool {
        self.click_key.is_some() && self.click_key == other.click_key
    }
}

/// Validated, sorted and non-overlapping entity list.
///
/// Zero-length anchors are exempt from the overlap rule; everything else,
/// icons included, must not start inside a previous entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    items: Vec<Entity>,
    /// Per entity: its range contains a script without a real bold face.
    fake_bold: Vec<bool>,
}

impl Entities {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate `items` against `text`.
    ///
    /// On failure the full entity list is logged before the error is
    /// returned.
    pub fn new(items: Vec<Entity>, text: &str) -> Result<Self, EntityError> {
        if let Err(err) = Self::validate(&items, text) {
            log::warn!("rejecting entities: {err}\n{}", dump(&items));
            return Err(err);
        }
        let fake_bold = items
            .iter()
            .map(|e| !e.is_empty() && text_needs_fake_bold(&text[e.range()]))
            .collect();
        Ok(Self { items, fake_bold })
    }

    /// Like [`Entities::new`], but degrades to an empty list.
    ///
    /// Invalid input is a bug in the producer, so debug builds assert.
    pub fn new_lossy(items: Vec<Entity>, text: &str) -> Self {
        match Self::new(items, text) {
            Ok(entities) => entities,
            Err(err) => {
                debug_assert!(false, "invalid entities: {err}");
                Self::empty()
            }
        }
    }

    fn validate(items: &[Entity], text: &str) -> Result<(), EntityError> {
        let len = text.len();
        let mut previous_start = 0;
        let mut previous_end = 0;
        for (index, entity) in items.iter().enumerate() {
            let (start, end) = (entity.start, entity.end);
            if start > end {
                return Err(EntityError::Reversed { index, start, end });
            }
            if end > len {
                return Err(EntityError::OutOfBounds {
                    index,
                    start,
                    end,
                    len,
                });
            }
            for offset in [start, end] {
                if !text.is_char_boundary(offset) {
                    return Err(EntityError::NotCharBoundary { index, offset });
                }
            }
            if start < previous_start {
                return Err(EntityError::Unsorted {
                    index,
                    start,
                    previous_start,
                });
            }
            previous_start = start;
            if entity.is_anchor() {
                continue;
            }
            if start < previous_end {
                return Err(EntityError::Overlapping {
                    index,
                    start,
                    previous_end,
                });
            }
            previous_end = end;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_spoilers(&self) -> bool {
        self.items.iter().any(|e| e.spoiler.is_some())
    }

    pub fn has_highlights(&self) -> bool {
        self.items.iter().any(|e| e.highlight.is_some())
    }

    /// Bold runs of entity `index` need synthetic emboldening.
    pub fn needs_fake_bold(&self, index: usize) -> bool {
        self.fake_bold.get(index).copied().unwrap_or(false)
    }

    /// Index of the entity covering byte `offset`, by linear scan.
    pub fn find_covering(&self, offset: usize) -> Option<usize> {
        self.items
            .iter()
            .position(|e| !e.is_empty() && e.start <= offset && offset < e.end)
    }

    pub fn find_anchor(&self, name: &str) -> Option<&Entity> {
        self.items
            .iter()
            .find(|e| e.anchor.as_deref() == Some(name))
    }
}

fn dump(items: &[Entity]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "#{i} {{start: {}, end: {}, flags: {:?}, icon: {}, spoiler: {:?}}}",
                e.start,
                e.end,
                e.flags,
                e.is_icon(),
                e.spoiler
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Forward-only scan over an [`Entities`] list.
///
/// Offsets passed in must never decrease; each entity is inspected a bounded
/// number of times, so a full layout pass is linear in text plus entities.
#[derive(Debug, Clone)]
pub struct EntityCursor<'a> {
    items: &'a [Entity],
    next: usize,
}

impl<'a> EntityCursor<'a> {
    pub fn new(entities: &'a Entities) -> Self {
        Self {
            items: entities.as_slice(),
            next: 0,
        }
    }

    /// First entity that is still relevant at `offset`: it covers or follows
    /// `offset`, or it is an icon placed exactly at `offset`.
    pub fn peek(&mut self, offset: usize) -> Option<(usize, &'a Entity)> {
        while let Some(entity) = self.items.get(self.next) {
            let passed = if entity.is_empty() {
                entity.is_anchor() || entity.start < offset
            } else {
                entity.end <= offset
            };
            if !passed {
                break;
            }
            self.next += 1;
        }
        self.items.get(self.next).map(|e| (self.next, e))
    }

    /// Mark the entity returned by the last [`peek`](Self::peek) as consumed.
    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Index of the entity covering `offset`.
    pub fn covering(&mut self, offset: usize) -> Option<usize> {
        self.peek(offset)?;
        // Icons placed at `offset` stay pending; look past them.
        self.items[self.next..]
            .iter()
            .position(|e| !e.is_empty() || e.start > offset)
            .map(|i| self.next + i)
            .filter(|&i| {
                let e = &self.items[i];
                !e.is_empty() && e.start <= offset
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sorted_entities() {
        let text = "hello world";
        let entities = Entities::new(
            vec![
                Entity::new(0..5).bold(),
                Entity::anchor(2, "a"),
                Entity::icon(5, 10.0, 10.0),
                Entity::new(6..11).italic(),
            ],
            text,
        )
        .unwrap();
        assert_eq!(entities.len(), 4);
        assert!(entities.find_anchor("a").is_some());
    }

    #[test]
    fn rejects_overlap_and_disorder() {
        let text = "hello world";
        let overlap = Entities::new(vec![Entity::new(0..5), Entity::new(3..8)], text);
        assert!(matches!(overlap, Err(EntityError::Overlapping { index: 1, .. })));

        let unsorted = Entities::new(vec![Entity::new(6..8), Entity::new(0..5)], text);
        assert!(matches!(unsorted, Err(EntityError::Unsorted { index: 1, .. })));

        let out_of_bounds = Entities::new(vec![Entity::new(6..20)], text);
        assert!(matches!(out_of_bounds, Err(EntityError::OutOfBounds { .. })));
    }

    #[test]
    fn rejects_split_codepoints() {
        let text = "\u{00E9}t\u{00E9}";
        let err = Entities::new(vec![Entity::new(1..3)], text).unwrap_err();
        assert_eq!(err, EntityError::NotCharBoundary { index: 0, offset: 1 });
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "invalid entities"))]
    fn lossy_degrades_to_empty_in_release() {
        let text = "hello";
        let entities = Entities::new_lossy(vec![Entity::new(2..4), Entity::new(0..1)], text);
        assert!(entities.is_empty());
    }

    #[test]
    fn fake_bold_is_scoped_to_each_range() {
        let text = "\u{4F60} plain bold";
        let entities = Entities::new(
            vec![Entity::new(0..3).bold(), Entity::new(10..14).bold()],
            text,
        )
        .unwrap();
        assert!(entities.needs_fake_bold(0));
        assert!(!entities.needs_fake_bold(1));
        assert!(!entities.needs_fake_bold(2));
    }

    #[test]
    fn cursor_matches_linear_scan() {
        let text = "aaaa bbbb cccc dddd";
        let entities = Entities::new(
            vec![
                Entity::new(0..4).bold(),
                Entity::anchor(4, "x"),
                Entity::icon(5, 8.0, 8.0),
                Entity::new(5..9),
                Entity::new(10..12),
                Entity::new(15..19),
            ],
            text,
        )
        .unwrap();
        let mut cursor = EntityCursor::new(&entities);
        for offset in 0..text.len() {
            assert_eq!(cursor.covering(offset), entities.find_covering(offset), "offset {offset}");
        }
    }

    #[test]
    fn cursor_reports_icons_at_their_offset() {
        let text = "ab";
        let entities = Entities::new(vec![Entity::icon(1, 4.0, 4.0)], text).unwrap();
        let mut cursor = EntityCursor::new(&entities);
        assert_eq!(cursor.peek(0).map(|(i, _)| i), Some(0));
        assert_eq!(cursor.peek(1).map(|(i, _)| i), Some(0));
        cursor.advance();
        assert!(cursor.peek(1).is_none());
    }
}
