//! Unicode utilities for rune-text.
//!
//! Grapheme segmentation, the codepoint classes used by the line breaker
//! and emoji detection.

pub mod classify;
pub mod emoji;
pub mod graphemes;

pub use emoji::{EmojiLimiter, EmojiMatcher, NoEmoji, UnicodeEmojiMatcher};
pub use graphemes::grapheme_end;
