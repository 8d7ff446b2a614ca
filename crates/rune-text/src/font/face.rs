use std::sync::Arc;

use swash::{FontRef, Metrics};

use crate::font::{FontError, FontMetrics, MetricsProvider, Result, ScaledFontMetrics, TextStyle};

/// Loaded font face backed by a font file (TTF/OTF).
///
/// This is a thin wrapper around `swash::FontRef` that owns the
/// underlying font data and exposes metrics and advance lookups.
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Full font data.
    data: Arc<[u8]>,
    /// Offset to the table directory for this font.
    offset: u32,
    /// Cache key used internally by swash.
    key: swash::CacheKey,
    /// Extracted font metrics in font units.
    metrics: FontMetrics,
}

impl FontFace {
    /// Create a font face from raw bytes and a font index within the file.
    pub fn from_bytes(data: Arc<[u8]>, index: usize) -> Result<Self> {
        let font = FontRef::from_index(&data, index).ok_or(FontError::InvalidFont)?;
        let metrics = Self::metrics_from_swash(&font);
        let (offset, key) = (font.offset, font.key);
        Ok(Self {
            data,
            offset,
            key,
            metrics,
        })
    }

    /// Create a font face from raw bytes owned by a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>, index: usize) -> Result<Self> {
        Self::from_bytes(Arc::from(data), index)
    }

    /// Create a font face from a font file on disk.
    pub fn from_path(path: impl AsRef<std::path::Path>, index: usize) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_vec(data, index)
    }

    fn as_swash_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn metrics_from_swash(font: &FontRef<'_>) -> FontMetrics {
        let Metrics {
            units_per_em,
            ascent,
            descent,
            leading,
            ..
        } = font.metrics(&[]);

        FontMetrics {
            ascent,
            descent,
            line_gap: leading,
            units_per_em,
        }
    }

    /// Font metrics in font units.
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Sum of horizontal advances for `text` at `font_size`, without shaping.
    pub fn advance(&self, text: &str, font_size: f32) -> f32 {
        let font = self.as_swash_ref();
        let charmap = font.charmap();
        let glyphs = font.glyph_metrics(&[]).scale(font_size);
        text.chars()
            .map(|c| glyphs.advance_width(charmap.map(c)))
            .sum()
    }
}

/// [`MetricsProvider`] over a single [`FontFace`] at a fixed pixel size.
///
/// Bold and fake-bold styles are emboldened synthetically by widening each
/// glyph advance.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    face: Arc<FontFace>,
    font_size: f32,
}

impl FaceMetrics {
    pub fn new(face: Arc<FontFace>, font_size: f32) -> Self {
        Self { face, font_size }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    fn embolden(&self, text: &str, style: TextStyle) -> f32 {
        if style.bold || style.fake_bold {
            text.chars().count() as f32 * self.font_size / 24.0
        } else {
            0.0
        }
    }
}

impl MetricsProvider for FaceMetrics {
    fn font_metrics(&self, _style: TextStyle) -> ScaledFontMetrics {
        self.face.metrics().scale_to_pixels(self.font_size)
    }

    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        self.face.advance(text, self.font_size) + self.embolden(text, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_font_data() {
        let err = FontFace::from_vec(vec![0, 1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, FontError::InvalidFont));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FontFace::from_path("/definitely/not/a/font.ttf", 0).unwrap_err();
        assert!(matches!(err, FontError::Io(_)));
    }
}
