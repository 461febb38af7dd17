//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur while measuring text in the mirror.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// The text contains a content unit the mirror cannot size.
    #[error("cannot measure content unit {unit:?} at character offset {offset}")]
    UnsupportedContent {
        /// The offending character.
        unit: char,
        /// Character offset of the unit within the measured text.
        offset: usize,
    },

    /// The mirror box has unusable dimensions.
    #[error("invalid mirror geometry: {width}x{height}")]
    InvalidGeometry { width: f32, height: f32 },

    /// The layout backend failed to shape the text.
    #[error("text shaping failed: {0}")]
    Shaping(String),
}

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;
