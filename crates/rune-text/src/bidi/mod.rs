//! Post-layout direction classification built on `unicode-bidi` classes.
//!
//! Parts are never moved by this pass; it only records how each part is
//! mirrored at draw time.

pub mod direction;

pub use direction::{Direction, DirectionSummary, resolve, text_direction};
