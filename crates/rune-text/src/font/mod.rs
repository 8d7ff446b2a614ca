pub mod face;
pub mod metrics;
pub mod provider;

pub use face::{FaceMetrics, FontFace};
pub use metrics::{FontMetrics, ScaledFontMetrics};
pub use provider::{ELLIPSIS, FixedMetrics, MetricsProvider, TextStyle};

use thiserror::Error;

/// Errors that can occur while loading fonts.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("font I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid font data")]
    InvalidFont,
}

/// Convenient result alias for font-related operations.
pub type Result<T> = std::result::Result<T, FontError>;
