//! Rounded-rectangle regions for background highlights, press highlights and
//! spoiler covers.
//!
//! Regions are a pure function of the part list and the horizontal draw
//! geometry. [`RegionCache`] memoizes them under that key; the vertical
//! origin is not part of the key, so cached rectangles are relative to the
//! top of the text and callers offset them by `start_y`.

use core::ops::Range;

use hashbrown::HashMap;

use crate::entity::{Entities, HighlightKey, SpoilerSpan};
use crate::layout::hit_test::Geometry;
use crate::layout::text_layout::Invalidation;
use crate::layout::{DrawOrigin, Part, Rect, Text};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRect {
    pub rect: Rect,
    pub radius: f32,
}

/// All background rectangles sharing one color pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub key: HighlightKey,
    pub rects: Vec<RoundRect>,
}

/// Cover over the parts of one spoiler.
#[derive(Debug, Clone, PartialEq)]
pub struct SpoilerRegion {
    /// Union of the spans of all member entities.
    pub span: SpoilerSpan,
    /// Member parts, whitespace bridges included.
    pub parts: Range<usize>,
    pub rects: Vec<RoundRect>,
    /// 0 is fully hidden, 1 fully revealed.
    pub reveal_progress: f32,
}

impl SpoilerRegion {
    /// Alpha of the cover.
    pub fn alpha(&self) -> f32 {
        1.0 - self.reveal_progress.clamp(0.0, 1.0)
    }

    pub fn is_revealed(&self) -> bool {
        self.reveal_progress >= 1.0
    }

    pub fn contains_part(&self, index: usize) -> bool {
        self.parts.contains(&index)
    }
}

/// Padding and rounding applied to region rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RegionStyle {
    pub padding: f32,
    pub spoiler_inset: f32,
    pub radius: f32,
}

/// One rectangle per line covered by `parts`.
pub(crate) fn line_rects(
    geometry: &Geometry<'_>,
    parts: &[Part],
    padding: f32,
    radius: f32,
) -> Vec<RoundRect> {
    let mut out: Vec<(usize, Rect)> = Vec::new();
    for part in parts {
        let rect = geometry.part_rect(part);
        match out.last_mut() {
            Some((line, current)) if *line == part.line_index => *current = current.union(&rect),
            _ => out.push((part.line_index, rect)),
        }
    }
    out.into_iter()
        .map(|(_, rect)| RoundRect {
            rect: rect.inset(-padding, 0.0),
            radius,
        })
        .collect()
}

/// Background regions, batched by highlight key in first-seen order.
pub(crate) fn build_backgrounds(
    geometry: &Geometry<'_>,
    entities: &Entities,
    parts: &[Part],
    style: RegionStyle,
) -> Vec<Region> {
    let key_of = |part: &Part| part.entity.and_then(|i| entities.get(i)).and_then(|e| e.highlight);
    let mut regions: Vec<Region> = Vec::new();
    let mut by_key: HashMap<HighlightKey, usize> = HashMap::new();
    let mut start = 0;
    while start < parts.len() {
        let Some(key) = key_of(&parts[start]) else {
            start += 1;
            continue;
        };
        let line = parts[start].line_index;
        let len = parts[start..]
            .iter()
            .take_while(|p| p.line_index == line && key_of(p) == Some(key))
            .count();
        let rects = line_rects(geometry, &parts[start..start + len], style.padding, style.radius);
        let index = *by_key.entry(key).or_insert_with(|| {
            regions.push(Region {
                key,
                rects: Vec::new(),
            });
            regions.len() - 1
        });
        regions[index].rects.extend(rects);
        start += len;
    }
    regions
}

/// Spoiler covers. Whitespace-only parts between two pieces of one spoiler
/// (or of two spoilers whose spans touch) are covered as well.
pub(crate) fn build_spoilers(
    geometry: &Geometry<'_>,
    source: &str,
    entities: &Entities,
    parts: &[Part],
    style: RegionStyle,
    reveal: &HashMap<SpoilerSpan, f32>,
) -> Vec<SpoilerRegion> {
    let spans: Vec<Option<SpoilerSpan>> = parts
        .iter()
        .map(|p| p.entity.and_then(|i| entities.get(i)).and_then(|e| e.spoiler))
        .collect();
    let mut regions = Vec::new();
    let mut index = 0;
    while index < parts.len() {
        let Some(mut span) = spans[index] else {
            index += 1;
            continue;
        };
        let start = index;
        let mut end = index + 1;
        loop {
            let mut next = end;
            while next < parts.len() && spans[next].is_none() && parts[next].is_whitespace(source) {
                next += 1;
            }
            match spans.get(next).copied().flatten() {
                Some(following) if following.offset <= span.end() => {
                    span = merge_spans(span, following);
                    end = next + 1;
                }
                _ => break,
            }
        }
        let rects = line_rects(geometry, &parts[start..end], 0.0, style.radius)
            .into_iter()
            .map(|r| RoundRect {
                rect: r.rect.inset(0.0, style.spoiler_inset),
                ..r
            })
            .collect();
        regions.push(SpoilerRegion {
            span,
            parts: start..end,
            rects,
            reveal_progress: reveal_progress(reveal, span),
        });
        index = end;
    }
    regions
}

/// Progress recorded for `span` or for any spoiler overlapping it; an entity
/// span and the merged span of its region share one reveal.
fn reveal_progress(reveal: &HashMap<SpoilerSpan, f32>, span: SpoilerSpan) -> f32 {
    reveal
        .iter()
        .filter(|(s, _)| s.offset < span.end() && span.offset < s.end())
        .map(|(_, p)| *p)
        .fold(0.0, f32::max)
}

fn merge_spans(a: SpoilerSpan, b: SpoilerSpan) -> SpoilerSpan {
    let offset = a.offset.min(b.offset);
    SpoilerSpan::new(offset, a.end().max(b.end()) - offset)
}

/// Memoized regions for one layout generation and horizontal geometry.
#[derive(Debug, Default)]
pub(crate) struct RegionCache {
    key: Option<([u32; 3], u64)>,
    pub backgrounds: Vec<Region>,
    pub spoilers: Vec<SpoilerRegion>,
    /// Press highlight rectangles keyed by the first pressed part.
    pub press_paths: HashMap<usize, Vec<RoundRect>>,
    /// Reveal progress by spoiler identity; survives geometry rebuilds.
    pub reveal: HashMap<SpoilerSpan, f32>,
}

impl RegionCache {
    pub fn is_valid(&self, horizontal: [u32; 3], generation: u64) -> bool {
        self.key == Some((horizontal, generation))
    }

    pub fn store(
        &mut self,
        horizontal: [u32; 3],
        generation: u64,
        backgrounds: Vec<Region>,
        spoilers: Vec<SpoilerRegion>,
    ) {
        log::trace!(
            "rebuilt {} background and {} spoiler regions",
            backgrounds.len(),
            spoilers.len()
        );
        self.key = Some((horizontal, generation));
        self.backgrounds = backgrounds;
        self.spoilers = spoilers;
        self.press_paths.clear();
    }

    /// Drop geometry; reveal progress is kept unless `reset_reveal`.
    pub fn invalidate(&mut self, reset_reveal: bool) {
        self.key = None;
        self.backgrounds.clear();
        self.spoilers.clear();
        self.press_paths.clear();
        if reset_reveal {
            self.reveal.clear();
        }
    }

    pub fn set_reveal_progress(&mut self, span: SpoilerSpan, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        self.reveal.insert(span, progress);
        for region in &mut self.spoilers {
            if region.span.offset <= span.offset && span.end() <= region.span.end() {
                region.reveal_progress = progress;
            }
        }
    }

    pub fn reveal_progress(&self, span: SpoilerSpan) -> f32 {
        reveal_progress(&self.reveal, span)
    }

    pub fn spoiler_for_part(&self, index: usize) -> Option<&SpoilerRegion> {
        self.spoilers.iter().find(|r| r.contains_part(index))
    }
}

impl Text {
    fn ensure_regions(&mut self, origin: DrawOrigin) {
        let key = origin.horizontal_key();
        if self.regions.is_valid(key, self.generation()) {
            return;
        }
        let dimensions = *self.dimensions();
        let style = RegionStyle {
            padding: dimensions.highlight_padding,
            spoiler_inset: dimensions.spoiler_inset,
            radius: dimensions.corner_radius,
        };
        let geometry = self.geometry(DrawOrigin {
            start_y: 0.0,
            ..origin
        });
        let entities = self.entities();
        let backgrounds = if entities.has_highlights() {
            build_backgrounds(&geometry, entities, self.parts(), style)
        } else {
            Vec::new()
        };
        let spoilers = if entities.has_spoilers() {
            build_spoilers(
                &geometry,
                self.source(),
                entities,
                self.parts(),
                style,
                &self.regions.reveal,
            )
        } else {
            Vec::new()
        };
        let generation = self.generation();
        self.regions.store(key, generation, backgrounds, spoilers);
    }

    /// Background regions for the text drawn at `origin`, relative to
    /// `origin.start_y`.
    pub fn background_regions(&mut self, origin: DrawOrigin) -> &[Region] {
        self.ensure_regions(origin);
        &self.regions.backgrounds
    }

    /// Spoiler covers for the text drawn at `origin`, relative to
    /// `origin.start_y`.
    pub fn spoiler_regions(&mut self, origin: DrawOrigin) -> &[SpoilerRegion] {
        self.ensure_regions(origin);
        &self.regions.spoilers
    }

    /// Progress of a reveal animation driven by the host.
    pub fn set_spoiler_reveal_progress(&mut self, span: SpoilerSpan, progress: f32) {
        self.regions.set_reveal_progress(span, progress);
        self.notify(Invalidation::Redraw);
    }

    /// Rectangles of the current press highlight, relative to
    /// `origin.start_y`.
    pub fn press_highlight(&mut self, origin: DrawOrigin) -> Option<&[RoundRect]> {
        let range = self.pressed_range()?;
        self.ensure_regions(origin);
        if !self.regions.press_paths.contains_key(&range.start) {
            let dimensions = *self.dimensions();
            let geometry = self.geometry(DrawOrigin {
                start_y: 0.0,
                ..origin
            });
            let rects = line_rects(
                &geometry,
                &self.parts()[range.clone()],
                dimensions.highlight_padding,
                dimensions.corner_radius,
            );
            self.regions.press_paths.insert(range.start, rects);
        }
        self.regions.press_paths.get(&range.start).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::layout::{DrawOrigin, LineBox, PartKind};

    const STYLE: RegionStyle = RegionStyle {
        padding: 2.0,
        spoiler_inset: 1.0,
        radius: 3.0,
    };

    fn geometry<'a>(lines: &'a [LineBox], entities: &'a Entities) -> Geometry<'a> {
        Geometry {
            lines,
            entities,
            origin: DrawOrigin::new(0.0, 0.0),
            max_width: 200.0,
            text_width: 200.0,
            base_line_height: 12.0,
            ascent: 8.0,
            align_center: false,
            has_media: false,
        }
    }

    fn part(range: Range<usize>, x: f32, line: usize, entity: Option<usize>) -> Part {
        let width = (range.end - range.start) as f32 * 10.0;
        Part::new(PartKind::Text, range, line, 0)
            .at(x, line as f32 * 12.0, width)
            .with_entity(entity)
    }

    #[test]
    fn backgrounds_merge_runs_and_batch_keys() {
        let source = "ab cd ef";
        let key = HighlightKey {
            background: 1,
            outline: 2,
        };
        let entities = Entities::new(
            vec![
                Entity::new(0..2).with_highlight(key),
                Entity::new(6..8).with_highlight(key),
            ],
            source,
        )
        .unwrap();
        let lines = [LineBox::new(80.0, 12.0, 0.0)];
        let parts = [
            part(0..2, 0.0, 0, Some(0)),
            part(2..6, 20.0, 0, None),
            part(6..8, 60.0, 0, Some(1)),
        ];
        let regions = build_backgrounds(&geometry(&lines, &entities), &entities, &parts, STYLE);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rects.len(), 2);
        assert_eq!(regions[0].rects[0].rect, Rect::new(-2.0, 0.0, 22.0, 12.0));
        assert_eq!(regions[0].rects[0].radius, 3.0);
    }

    #[test]
    fn spoiler_bridges_whitespace_within_one_span() {
        let source = "ab cd";
        let span = SpoilerSpan::new(0, 5);
        let entities = Entities::new(
            vec![
                Entity::new(0..2).with_spoiler(span),
                Entity::new(3..5).bold().with_spoiler(span),
            ],
            source,
        )
        .unwrap();
        let lines = [LineBox::new(50.0, 12.0, 0.0)];
        let parts = [
            part(0..2, 0.0, 0, Some(0)),
            part(2..3, 20.0, 0, None),
            part(3..5, 30.0, 0, Some(1)),
        ];
        let mut reveal = HashMap::new();
        reveal.insert(span, 0.25);
        let spoilers = build_spoilers(
            &geometry(&lines, &entities),
            source,
            &entities,
            &parts,
            STYLE,
            &reveal,
        );
        assert_eq!(spoilers.len(), 1);
        assert_eq!(spoilers[0].parts, 0..3);
        assert_eq!(spoilers[0].rects.len(), 1);
        assert_eq!(spoilers[0].rects[0].rect, Rect::new(0.0, 1.0, 50.0, 11.0));
        assert_eq!(spoilers[0].alpha(), 0.75);
    }

    #[test]
    fn separate_spoilers_stay_separate() {
        let source = "ab cd";
        let entities = Entities::new(
            vec![
                Entity::new(0..2).with_spoiler(SpoilerSpan::new(0, 2)),
                Entity::new(3..5).with_spoiler(SpoilerSpan::new(3, 2)),
            ],
            source,
        )
        .unwrap();
        let lines = [LineBox::new(50.0, 12.0, 0.0)];
        let parts = [
            part(0..2, 0.0, 0, Some(0)),
            part(2..3, 20.0, 0, None),
            part(3..5, 30.0, 0, Some(1)),
        ];
        let spoilers = build_spoilers(
            &geometry(&lines, &entities),
            source,
            &entities,
            &parts,
            STYLE,
            &HashMap::new(),
        );
        assert_eq!(spoilers.len(), 2);
        assert_eq!(spoilers[1].parts, 2..3);
    }

    #[test]
    fn reveal_progress_survives_invalidation() {
        let mut cache = RegionCache::default();
        let span = SpoilerSpan::new(0, 4);
        cache.set_reveal_progress(span, 2.0);
        cache.invalidate(false);
        assert_eq!(cache.reveal.get(&span), Some(&1.0));
        cache.invalidate(true);
        assert!(cache.reveal.is_empty());
    }
}
