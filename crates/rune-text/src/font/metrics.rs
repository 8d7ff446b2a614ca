/// Font-level metrics in font units.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Ascent above baseline (positive).
    pub ascent: f32,
    /// Descent below baseline (positive).
    pub descent: f32,
    /// Line gap (leading).
    pub line_gap: f32,
    /// Units per em.
    pub units_per_em: u16,
}

impl FontMetrics {
    /// Scale metrics to pixel size, where `font_size` is in logical pixels
    /// (px per em).
    pub fn scale_to_pixels(&self, font_size: f32) -> ScaledFontMetrics {
        let scale = if self.units_per_em != 0 {
            font_size / self.units_per_em as f32
        } else {
            1.0
        };
        ScaledFontMetrics {
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            line_gap: self.line_gap * scale,
        }
    }
}

/// Scaled font metrics in pixels, as consumed by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

impl ScaledFontMetrics {
    pub fn new(ascent: f32, descent: f32, line_gap: f32) -> Self {
        Self {
            ascent,
            descent,
            line_gap,
        }
    }

    /// Distance from the top of the ascent to the bottom of the descent.
    pub fn glyph_height(&self) -> f32 {
        (self.ascent + self.descent).abs()
    }

    /// Glyph height plus the font's own leading.
    pub fn line_height(&self) -> f32 {
        self.glyph_height() + self.line_gap
    }
}
