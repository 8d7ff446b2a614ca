//! Ellipsis placement once the line limit is reached.

use core::ops::Range;

use crate::font::{ELLIPSIS, TextStyle};
use crate::layout::cursor::LayoutCursor;
use crate::layout::measure::Measurer;
use crate::layout::{LayoutContext, Part, TextFlags};

/// Finish the last kept line with an ellipsis.
///
/// When the ellipsis (optionally preceded by a prefix of `pending`, the text
/// that did not fit) still fits after the last part, it is appended. Failing
/// that, parts are removed from the end of the last line until one can be
/// shortened to make room. Icons and emoji are replaced by the ellipsis as a
/// whole. If nothing on the line can make room, every part and line is
/// dropped and the layout collapses to a single empty line.
pub(crate) fn ellipsize(
    ctx: &LayoutContext<'_>,
    measurer: &Measurer<'_>,
    cur: &mut LayoutCursor,
    pending: Option<Range<usize>>,
    entity: Option<usize>,
    base_line_height: f32,
) {
    cur.ellipsized = true;
    let Some(last) = cur.parts.last() else {
        return;
    };
    let Some(line_index) = cur.lines.len().checked_sub(1) else {
        return;
    };
    let (last_line, last_paragraph, last_end) = (last.line_index, last.paragraph_index, last.range.end);
    let line_width = cur.lines[line_index].width;
    let line_max = ctx.line_max_width(line_index, cur.y);
    let style = ctx.style(entity);
    let pending = pending.filter(|r| !r.is_empty());
    let ellipsis_width = measurer.measure(ELLIPSIS, style);

    let fill = match &pending {
        Some(range) if !ctx.flags.contains(TextFlags::ELLIPSIZE_NO_FILL) => fill_prefix(
            measurer,
            &ctx.text[range.clone()].replace('\n', " "),
            style,
            line_max - line_width,
        ),
        _ => None,
    };
    let fill_width = fill.as_deref().map_or(0.0, |f| measurer.measure(f, style));
    let fits = line_width + fill_width + ellipsis_width <= line_max;
    let extra_line = !fits
        && ctx.flags.contains(TextFlags::ELLIPSIZE_NEWLINE)
        && ctx.max_lines.is_some_and(|max| cur.lines.len() + 1 == max);

    let x = if fits || extra_line {
        let mut line = last_line;
        let mut x = line_width;
        let fill = if extra_line {
            cur.y += cur.lines[line_index].height;
            cur.add_line(0.0, base_line_height);
            line += 1;
            x = 0.0;
            None
        } else {
            fill
        };
        let offset = pending.as_ref().map_or(last_end, |r| r.start);
        if let Some(fill) = fill {
            cur.parts.push(
                Part::synthetic(fill, offset, line, last_paragraph)
                    .at(x, cur.y, fill_width)
                    .with_entity(entity),
            );
            x += fill_width;
        }
        cur.parts.push(
            Part::synthetic(ELLIPSIS, offset, line, last_paragraph)
                .at(x, cur.y, ellipsis_width)
                .with_entity(entity),
        );
        x + ellipsis_width
    } else {
        shorten_last_line(ctx, measurer, cur, pending.as_ref(), last_line, line_max)
    };

    settle(cur, x, base_line_height);
}

fn shorten_last_line(
    ctx: &LayoutContext<'_>,
    measurer: &Measurer<'_>,
    cur: &mut LayoutCursor,
    pending: Option<&Range<usize>>,
    line: usize,
    line_max: f32,
) -> f32 {
    let min_end = cur.parts.last().map_or(0, |p| p.range.end);
    let plain_ellipsis = measurer.measure(ELLIPSIS, ctx.style(None));

    while let Some(index) = cur.parts.len().checked_sub(1) {
        let part = &cur.parts[index];
        if part.line_index != line {
            break;
        }
        let part_style = ctx.style(part.entity);
        let ellipsis_width = measurer.measure(ELLIPSIS, part_style);

        if part.is_static() {
            if part.x + ellipsis_width <= line_max {
                let x = part.x + ellipsis_width;
                let replacement = Part::synthetic(
                    ELLIPSIS,
                    part.range.start,
                    part.line_index,
                    part.paragraph_index,
                )
                .at(part.x, part.y, ellipsis_width)
                .with_entity(part.entity);
                cur.parts[index] = replacement;
                return x;
            }
        } else if part.x + plain_ellipsis <= line_max {
            let source = match &part.trimmed {
                Some(trimmed) => trimmed.to_string(),
                None => {
                    let end = pending.map_or(min_end, |r| r.end.max(min_end));
                    ctx.text[part.range.start..end].replace('\n', " ")
                }
            };
            if let Some(prefix) = fill_prefix(measurer, &source, part_style, line_max - part.x) {
                let prefix_width = measurer.measure(&prefix, part_style);
                if part.x + prefix_width + ellipsis_width <= line_max {
                    let ellipsis_x = part.x + prefix_width;
                    let ellipsis = Part::synthetic(
                        ELLIPSIS,
                        part.range.end,
                        part.line_index,
                        part.paragraph_index,
                    )
                    .at(ellipsis_x, part.y, ellipsis_width)
                    .with_entity(part.entity);
                    let part = &mut cur.parts[index];
                    part.trimmed = Some(prefix.into());
                    part.width = prefix_width;
                    cur.parts.push(ellipsis);
                    return ellipsis_x + ellipsis_width;
                }
            }
        }
        cur.parts.pop();
    }

    log::debug!("no room for an ellipsis on line {line}; dropping all parts");
    cur.parts.clear();
    cur.lines.clear();
    cur.y = 0.0;
    cur.x = 0.0;
    cur.current_width = 0.0;
    cur.max_part_height = 0.0;
    0.0
}

/// Prefix of `source` that leaves room for an ellipsis within `available`.
fn fill_prefix(
    measurer: &Measurer<'_>,
    source: &str,
    style: TextStyle,
    available: f32,
) -> Option<String> {
    let provider = measurer.provider();
    let mut truncated = provider.truncate_to_width(source, style, available);
    if !truncated.ends_with(ELLIPSIS) {
        // The whole source fits; it still has to leave room for the ellipsis.
        let ellipsis_width = measurer.measure(ELLIPSIS, style);
        truncated = provider.truncate_to_width(source, style, available - ellipsis_width);
    }
    let prefix = truncated.strip_suffix(ELLIPSIS).unwrap_or(&truncated);
    (!prefix.is_empty()).then(|| prefix.to_owned())
}

/// Recompute the last line after its parts changed.
fn settle(cur: &mut LayoutCursor, x: f32, base_line_height: f32) {
    let Some(line_index) = cur.lines.len().checked_sub(1) else {
        return;
    };
    let previous_width = cur.lines[line_index].width;
    cur.max_part_height = cur.max_part_height_on(line_index);
    let height = cur.line_height(base_line_height);
    let line = &mut cur.lines[line_index];
    line.width = x;
    line.height = height;
    if x >= previous_width {
        cur.current_width = cur.current_width.max(x);
    } else {
        cur.recompute_width();
    }
    cur.y += height;
    cur.x = x;
}

#[cfg(test)]
mod tests {
    use crate::entity::{Entities, Entity};
    use crate::font::FixedMetrics;
    use crate::layout::line_breaker::layout;
    use crate::layout::{Dimensions, LayoutContext, PartKind, TextFlags};
    use crate::unicode::NoEmoji;

    fn context<'a>(
        text: &'a str,
        entities: &'a Entities,
        provider: &'a FixedMetrics,
        max_width: f32,
        max_lines: usize,
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
            max_lines: Some(max_lines),
            suffix: None,
            suffix_width: 0.0,
            emoji_limit: None,
            fake_bold: false,
        }
    }

    fn rendered(text: &str, parts: &[crate::layout::Part]) -> String {
        parts.iter().map(|p| p.text(text)).collect()
    }

    #[test]
    fn appends_ellipsis_when_it_fits() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "ab cdefgh";
        let out = layout(&context(text, &entities, &provider, 50.0, 1));
        assert!(out.ellipsized);
        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.parts.len(), 3);
        assert_eq!(rendered(text, &out.parts), "ab c\u{2026}");
        assert!(out.lines[0].width <= 50.0);
    }

    #[test]
    fn shortens_last_part_when_line_is_full() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "ab cd ef";
        let out = layout(&context(text, &entities, &provider, 50.0, 1));
        assert_eq!(rendered(text, &out.parts), "ab c\u{2026}");
        assert_eq!(out.parts.len(), 2);
    }

    #[test]
    fn shortens_full_line() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "hello world foo";
        let out = layout(&context(text, &entities, &provider, 50.0, 1));
        assert!(out.ellipsized);
        assert_eq!(rendered(text, &out.parts), "hell\u{2026}");
        assert_eq!(out.lines[0].width, 50.0);
        assert_eq!(out.parts.last().map(|p| p.text(text)), Some("\u{2026}"));
    }

    #[test]
    fn no_fill_only_appends() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "ab cdefgh";
        let mut ctx = context(text, &entities, &provider, 50.0, 1);
        ctx.flags = TextFlags::ELLIPSIZE_NO_FILL;
        let out = layout(&ctx);
        assert_eq!(rendered(text, &out.parts), "ab \u{2026}");
    }

    #[test]
    fn icon_is_replaced_wholesale() {
        let provider = FixedMetrics::new(10.0);
        let text = "abcd efgh";
        let entities = Entities::new(vec![Entity::icon(4, 10.0, 10.0)], text).unwrap();
        let out = layout(&context(text, &entities, &provider, 50.0, 1));
        assert!(out.ellipsized);
        assert!(out.parts.iter().all(|p| p.kind == PartKind::Text));
        assert_eq!(rendered(text, &out.parts), "abcd\u{2026}");
    }

    #[test]
    fn ellipsis_may_move_to_an_extra_line() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "aaaaa\n\nbbbbbb";

        let out = layout(&context(text, &entities, &provider, 50.0, 2));
        assert_eq!(out.lines.len(), 1);
        assert!(rendered(text, &out.parts).ends_with('\u{2026}'));

        let mut ctx = context(text, &entities, &provider, 50.0, 2);
        ctx.flags = TextFlags::ELLIPSIZE_NEWLINE;
        let out = layout(&ctx);
        assert!(out.ellipsized);
        assert_eq!(out.lines.len(), 2);
        assert_eq!(rendered(text, &out.parts), "aaaaa\u{2026}");
        let ellipsis = out.parts.last().unwrap();
        assert_eq!((ellipsis.line_index, ellipsis.x), (1, 0.0));
        assert_eq!(out.lines[1].width, 10.0);
    }

    #[test]
    fn no_room_for_an_ellipsis_leaves_an_empty_line() {
        let provider = FixedMetrics::new(10.0);
        let entities = Entities::empty();
        let text = "abc def";
        let out = layout(&context(text, &entities, &provider, 5.0, 2));
        assert!(out.ellipsized);
        assert!(out.parts.is_empty());
        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.lines[0].width, 0.0);
        assert_eq!(out.width, 0.0);
        assert_eq!(out.height, out.lines[0].height);
    }
}
