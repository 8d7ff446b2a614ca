use crate::layout::{LineBox, Part};
use crate::unicode::EmojiLimiter;

/// The line-count limit was hit; layout stops after truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineLimitReached;

/// Outcome of one layout step. `Err` unwinds to the paragraph loop.
pub(crate) type LayoutStep = Result<(), LineLimitReached>;

/// Mutable position and output of a layout pass.
#[derive(Debug, Default)]
pub(crate) struct LayoutCursor {
    pub x: f32,
    /// Top of the current line.
    pub y: f32,
    /// Widest line so far.
    pub current_width: f32,
    /// Tallest inline icon on the current line.
    pub max_part_height: f32,
    pub paragraph_index: usize,
    /// Last part on the current line that the next run may extend.
    pub merge_candidate: Option<usize>,
    /// Full-width entity occupying the current line.
    pub full_width_entity: Option<usize>,
    pub parts: Vec<Part>,
    pub lines: Vec<LineBox>,
    pub ellipsized: bool,
    pub emoji: EmojiLimiter,
    pub custom_emoji_count: usize,
}

impl LayoutCursor {
    pub fn new(emoji_limit: Option<usize>) -> Self {
        Self {
            emoji: EmojiLimiter::new(emoji_limit),
            ..Self::default()
        }
    }

    /// Index of the line being filled.
    pub fn line_index(&self) -> usize {
        self.lines.len()
    }

    pub fn line_height(&self, base: f32) -> f32 {
        self.max_part_height.max(base)
    }

    pub fn add_line(&mut self, width: f32, height: f32) {
        self.lines.push(LineBox::new(width, height, self.y));
    }

    /// Close the current line and move to the start of the next one.
    ///
    /// Returns the closed line's height and the icon height tracked on it,
    /// which [`ensure_line_count`](Self::ensure_line_count) needs to undo
    /// the move.
    pub fn break_line(&mut self, base_line_height: f32) -> (f32, f32) {
        let line_height = self.line_height(base_line_height);
        let previous_max_part_height = self.max_part_height;
        self.add_line(self.x, line_height);
        self.merge_candidate = None;
        self.full_width_entity = None;
        self.max_part_height = 0.0;
        self.current_width = self.current_width.max(self.x);
        self.x = 0.0;
        self.y += line_height;
        (line_height, previous_max_part_height)
    }

    /// Fail when the line just started would exceed `max_lines`.
    ///
    /// On failure the vertical position is rolled back to the top of the last
    /// kept line, and surplus or trailing blank lines are dropped.
    pub fn ensure_line_count(
        &mut self,
        max_lines: Option<usize>,
        last_line_height: f32,
        previous_max_part_height: f32,
    ) -> LayoutStep {
        let Some(max_lines) = max_lines else {
            return Ok(());
        };
        if self.lines.len() < max_lines {
            return Ok(());
        }
        self.y -= last_line_height;
        self.max_part_height = previous_max_part_height;
        while let Some(last) = self.lines.last() {
            let surplus = self.lines.len() > max_lines;
            let trailing_blank = self.lines.len() > 1 && last.is_blank();
            if !surplus && !trailing_blank {
                break;
            }
            self.lines.pop();
            if let Some(kept) = self.lines.last() {
                self.y -= kept.height;
                self.max_part_height = kept.height;
            }
        }
        self.merge_candidate = None;
        Err(LineLimitReached)
    }

    /// Widest line, recomputed from scratch.
    pub fn recompute_width(&mut self) {
        self.current_width = self.lines.iter().map(|l| l.width).fold(0.0, f32::max);
    }

    /// Tallest explicit part height on `line_index`, scanning from the end.
    pub fn max_part_height_on(&self, line_index: usize) -> f32 {
        self.parts
            .iter()
            .rev()
            .take_while(|p| p.line_index == line_index)
            .filter_map(|p| p.height)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_line_records_width_and_advances() {
        let mut cursor = LayoutCursor::new(None);
        cursor.x = 42.0;
        cursor.max_part_height = 30.0;
        let (height, previous) = cursor.break_line(20.0);
        assert_eq!(height, 30.0);
        assert_eq!(previous, 30.0);
        assert_eq!(cursor.lines, vec![LineBox::new(42.0, 30.0, 0.0)]);
        assert_eq!(cursor.x, 0.0);
        assert_eq!(cursor.y, 30.0);
        assert_eq!(cursor.current_width, 42.0);
    }

    #[test]
    fn unlimited_never_fails() {
        let mut cursor = LayoutCursor::new(None);
        for _ in 0..10 {
            let (h, p) = cursor.break_line(10.0);
            assert!(cursor.ensure_line_count(None, h, p).is_ok());
        }
    }

    #[test]
    fn limit_rolls_back_to_last_kept_line() {
        let mut cursor = LayoutCursor::new(None);
        cursor.x = 5.0;
        let (h, p) = cursor.break_line(10.0);
        assert!(cursor.ensure_line_count(Some(2), h, p).is_ok());
        cursor.x = 7.0;
        let (h, p) = cursor.break_line(10.0);
        assert_eq!(cursor.ensure_line_count(Some(2), h, p), Err(LineLimitReached));
        assert_eq!(cursor.lines.len(), 2);
        assert_eq!(cursor.y, 10.0);
    }

    #[test]
    fn limit_drops_trailing_blank_lines() {
        let mut cursor = LayoutCursor::new(None);
        cursor.x = 5.0;
        cursor.break_line(10.0);
        let (h, p) = cursor.break_line(10.0);
        assert!(cursor.ensure_line_count(Some(2), h, p).is_err());
        assert_eq!(cursor.lines.len(), 1);
        assert_eq!(cursor.y, 0.0);
    }
}
