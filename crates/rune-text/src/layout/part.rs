use core::ops::Range;

/// What a [`Part`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Text,
    Emoji,
    Icon,
}

/// One positioned, styled visual run.
///
/// `range` always points into the source text. Parts synthesized by
/// truncation or the suffix carry their own text in `trimmed`, which then
/// overrides the source range for drawing and direction detection; the
/// part's `width` is the width of that override.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub line_index: usize,
    pub paragraph_index: usize,
    pub range: Range<usize>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Explicit height for icons; `None` uses the line height.
    pub height: Option<f32>,
    /// Index into the owning text's entity list.
    pub entity: Option<usize>,
    pub kind: PartKind,
    pub rtl: bool,
    /// Direction was inherited from surrounding lines rather than detected
    /// from the part's own line.
    pub rtl_fake: bool,
    pub trimmed: Option<Box<str>>,
}

impl Part {
    pub(crate) fn new(
        kind: PartKind,
        range: Range<usize>,
        line_index: usize,
        paragraph_index: usize,
    ) -> Self {
        Self {
            line_index,
            paragraph_index,
            range,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: None,
            entity: None,
            kind,
            rtl: false,
            rtl_fake: false,
            trimmed: None,
        }
    }

    /// Part rendering a synthetic string at `offset` in the source.
    pub(crate) fn synthetic(
        text: impl Into<Box<str>>,
        offset: usize,
        line_index: usize,
        paragraph_index: usize,
    ) -> Self {
        Self {
            trimmed: Some(text.into()),
            ..Self::new(PartKind::Text, offset..offset, line_index, paragraph_index)
        }
    }

    pub(crate) fn at(mut self, x: f32, y: f32, width: f32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self
    }

    pub(crate) fn with_entity(mut self, entity: Option<usize>) -> Self {
        self.entity = entity;
        self
    }

    /// Text drawn for this part.
    pub fn text<'a>(&'a self, source: &'a str) -> &'a str {
        match &self.trimmed {
            Some(trimmed) => trimmed,
            None => &source[self.range.clone()],
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.trimmed.is_some()
    }

    pub fn is_emoji(&self) -> bool {
        self.kind == PartKind::Emoji
    }

    pub fn is_icon(&self) -> bool {
        self.kind == PartKind::Icon
    }

    /// Icons and emoji cannot be shortened by truncation.
    pub fn is_static(&self) -> bool {
        self.kind != PartKind::Text
    }

    pub fn is_whitespace(&self, source: &str) -> bool {
        self.kind == PartKind::Text && self.text(source).chars().all(char::is_whitespace)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn set_rtl_mode(&mut self, rtl: bool, fake: bool) {
        self.rtl = rtl;
        self.rtl_fake = fake;
    }

    /// Adjacent text parts of one entity that can be drawn in one call.
    pub fn would_merge_with_next(&self, next: &Part) -> bool {
        self.kind == PartKind::Text
            && next.kind == PartKind::Text
            && self.trimmed.is_none()
            && next.trimmed.is_none()
            && self.line_index == next.line_index
            && self.entity == next.entity
            && self.rtl == next.rtl
            && self.range.end == next.range.start
    }
}
