//! rune-text: rich-text layout and hit testing.
//!
//! A [`Text`] takes a string plus a sorted list of styled [`Entity`] ranges
//! and lays it out into positioned [`Part`]s and [`LineBox`]es:
//! - line breaking at word boundaries, with per-grapheme fallback for words
//!   wider than a line
//! - truncation to a maximum line count with an ellipsis
//! - per-line direction for right-to-left scripts
//! - background, press and spoiler regions
//! - hit testing, touch handling and drawing through a host [`Surface`]
//!
//! Glyph rendering stays with the host: measurement goes through a
//! [`MetricsProvider`] and drawing through a [`Surface`].

pub mod bidi;
pub mod draw;
pub mod entity;
pub mod error;
pub mod font;
pub mod layout;
pub mod region;
pub mod touch;
pub mod unicode;

pub use bidi::{Direction, DirectionSummary};
pub use draw::{Color, ColorSet, Surface, TextRun};
pub use entity::{Entities, Entity, EntityFlags, HighlightKey, IconSize, SpoilerSpan};
pub use error::{EntityError, LayoutError};
pub use font::{
    ELLIPSIS, FaceMetrics, FixedMetrics, FontError, FontFace, FontMetrics, MetricsProvider,
    ScaledFontMetrics, TextStyle,
};
pub use layout::text_layout::{DEFAULT_SLOW_LAYOUT_THRESHOLD, Invalidation};
pub use layout::{
    Dimensions, DrawOrigin, LineBox, LineWidthProvider, Part, PartKind, Point, Rect, Text,
    TextBuilder, TextFlags,
};
pub use region::{Region, RoundRect, SpoilerRegion};
pub use touch::{Click, ClickCallback, TouchPhase};
pub use unicode::{EmojiLimiter, EmojiMatcher, NoEmoji, UnicodeEmojiMatcher};
