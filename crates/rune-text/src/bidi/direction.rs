use core::ops::Range;

use unicode_bidi::{BidiClass, bidi_class};

use crate::entity::Entities;
use crate::layout::{Part, PartKind};

/// Direction of a run, line or paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
    /// No strong characters.
    Neutral,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }

    fn strong(self) -> Option<Direction> {
        (self != Direction::Neutral).then_some(self)
    }
}

/// Majority direction of the strong characters in `text`.
pub fn text_direction(text: &str) -> Direction {
    let (mut rtl, mut ltr) = (0usize, 0usize);
    for c in text.chars() {
        match bidi_class(c) {
            BidiClass::R | BidiClass::AL => rtl += 1,
            BidiClass::L => ltr += 1,
            _ => {}
        }
    }
    if rtl > ltr {
        Direction::Rtl
    } else if ltr > 0 {
        Direction::Ltr
    } else {
        Direction::Neutral
    }
}

/// Whole-text facts derived while tagging parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionSummary {
    /// Every part is right-to-left.
    pub fully_rtl: bool,
    /// No line has a strong direction; the host may pick one from its locale.
    pub may_apply_rtl: bool,
}

/// Tag every part with the direction of its line.
///
/// A line is right-to-left when any essential part on it is, left-to-right
/// when any essential part is, and neutral otherwise. Neutral lines that
/// open a paragraph take the direction of the paragraph's first strong line;
/// later neutral lines keep the direction of the line before them. Paragraphs
/// without any strong line take the direction of the previous paragraph.
/// Inherited directions are marked with `rtl_fake`.
pub fn resolve(source: &str, entities: &Entities, parts: &mut [Part]) -> DirectionSummary {
    let mut previous_paragraph = Direction::Ltr;
    let mut all_neutral = true;
    let mut start = 0;
    while start < parts.len() {
        let paragraph = parts[start].paragraph_index;
        let end = start
            + parts[start..]
                .iter()
                .take_while(|p| p.paragraph_index == paragraph)
                .count();

        let lines = line_directions(source, entities, &parts[start..end], start);
        let first_strong = lines.iter().find_map(|(_, d)| d.strong());
        let mut running = first_strong.unwrap_or(previous_paragraph);
        for (range, direction) in lines {
            let fake = match direction.strong() {
                Some(strong) => {
                    running = strong;
                    all_neutral = false;
                    false
                }
                None => true,
            };
            for part in &mut parts[range] {
                part.set_rtl_mode(running.is_rtl(), fake);
            }
        }
        if let Some(strong) = first_strong {
            previous_paragraph = strong;
        }
        start = end;
    }

    DirectionSummary {
        fully_rtl: !parts.is_empty() && parts.iter().all(|p| p.rtl),
        may_apply_rtl: all_neutral,
    }
}

/// Direction of each line in one paragraph, with absolute part ranges.
fn line_directions(
    source: &str,
    entities: &Entities,
    paragraph: &[Part],
    offset: usize,
) -> Vec<(Range<usize>, Direction)> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < paragraph.len() {
        let line = paragraph[start].line_index;
        let len = paragraph[start..]
            .iter()
            .take_while(|p| p.line_index == line)
            .count();
        let mut direction = Direction::Neutral;
        for part in &paragraph[start..start + len] {
            if !is_essential(source, entities, part) {
                continue;
            }
            match text_direction(part.text(source)) {
                Direction::Rtl => {
                    direction = Direction::Rtl;
                    break;
                }
                Direction::Ltr => direction = Direction::Ltr,
                Direction::Neutral => {}
            }
        }
        out.push((offset + start..offset + start + len, direction));
        start += len;
    }
    out
}

fn is_essential(source: &str, entities: &Entities, part: &Part) -> bool {
    part.kind == PartKind::Text
        && !part.is_whitespace(source)
        && part
            .entity
            .and_then(|i| entities.get(i))
            .is_none_or(|e| e.is_essential())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityFlags, Entity};

    fn part(range: Range<usize>, line: usize, paragraph: usize) -> Part {
        Part::new(PartKind::Text, range, line, paragraph)
    }

    #[test]
    fn majority_decides_text_direction() {
        assert_eq!(text_direction("abc"), Direction::Ltr);
        assert_eq!(text_direction("\u{05D0}\u{05D1}\u{05D2} ab"), Direction::Rtl);
        assert_eq!(text_direction("123 !?"), Direction::Neutral);
    }

    #[test]
    fn neutral_line_takes_paragraph_direction() {
        // "123" wraps onto its own line before the Hebrew word.
        let source = "123 \u{05D0}\u{05D1}";
        let mut parts = vec![part(0..4, 0, 0), part(4..8, 1, 0)];
        let summary = resolve(source, &Entities::empty(), &mut parts);
        assert!(parts[0].rtl && parts[0].rtl_fake);
        assert!(parts[1].rtl && !parts[1].rtl_fake);
        assert!(summary.fully_rtl);
        assert!(!summary.may_apply_rtl);
    }

    #[test]
    fn neutral_paragraph_inherits_previous_paragraph() {
        let source = "\u{05D0}\u{05D1}\n42";
        let mut parts = vec![part(0..4, 0, 0), part(5..7, 1, 1)];
        resolve(source, &Entities::empty(), &mut parts);
        assert!(parts[1].rtl);
        assert!(parts[1].rtl_fake);
    }

    #[test]
    fn non_essential_entities_do_not_vote() {
        let source = "\u{05D0}\u{05D1} abc";
        let entities = Entities::new(
            vec![Entity::new(5..8).with_flags(EntityFlags::NON_ESSENTIAL)],
            source,
        )
        .unwrap();
        let mut hebrew = part(0..5, 0, 0);
        hebrew.entity = None;
        let mut url = part(5..8, 0, 0);
        url.entity = Some(0);
        let mut parts = vec![hebrew, url];
        resolve(source, &entities, &mut parts);
        assert!(parts.iter().all(|p| p.rtl));
    }

    #[test]
    fn all_neutral_text_may_apply_rtl() {
        let source = "12 34";
        let mut parts = vec![part(0..5, 0, 0)];
        let summary = resolve(source, &Entities::empty(), &mut parts);
        assert!(summary.may_apply_rtl);
        assert!(!summary.fully_rtl);
    }
}
