use thiserror::Error;

/// Contract violations in an entity list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity #{index} range {start}..{end} is reversed")]
    Reversed { index: usize, start: usize, end: usize },

    #[error("entity #{index} range {start}..{end} exceeds text length {len}")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("entity #{index} boundary {offset} is not a char boundary")]
    NotCharBoundary { index: usize, offset: usize },

    #[error("entity #{index} starts at {start}, before the previous entity start {previous_start}")]
    Unsorted {
        index: usize,
        start: usize,
        previous_start: usize,
    },

    #[error("entity #{index} starts at {start}, inside the previous entity ending at {previous_end}")]
    Overlapping {
        index: usize,
        start: usize,
        previous_end: usize,
    },
}

/// Errors returned by [`crate::Text`] construction and updates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("max line count must be at least 1")]
    ZeroMaxLines,
}
