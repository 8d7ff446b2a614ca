/// One laid-out line: its advance and its height, placed at `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBox {
    /// Sum of the advances placed on the line, before any suffix.
    pub width: f32,
    /// Line height, grown by tall inline icons.
    pub height: f32,
    /// Y position of the line box top in pixels.
    pub y_offset: f32,
}

impl LineBox {
    pub fn new(width: f32, height: f32, y_offset: f32) -> Self {
        Self {
            width,
            height,
            y_offset,
        }
    }

    /// Get line box bottom Y position.
    pub fn bottom_y(&self) -> f32 {
        self.y_offset + self.height
    }

    /// A zero-width line models an empty paragraph.
    pub fn is_blank(&self) -> bool {
        self.width == 0.0
    }

    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.y_offset && y < self.bottom_y()
    }
}
