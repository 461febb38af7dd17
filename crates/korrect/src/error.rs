//! Error types for the overlay.

use std::fmt;

use thiserror::Error;

use korrect_render::MeasureError;

/// Errors returned by overlay operations.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// Measuring a correction span failed; the previous labels stay displayed.
    #[error(transparent)]
    Measure(#[from] MeasureError),

    /// The correction span does not fit the current text.
    #[error("span {offset}+{length} exceeds text of {text_len} characters")]
    OffsetOutOfBounds {
        offset: usize,
        length: usize,
        text_len: usize,
    },

    /// The correction was produced for an older version of the text.
    #[error("correction batch is for text revision {batch_revision}, current is {text_revision}")]
    StaleCorrection {
        batch_revision: u64,
        text_revision: u64,
    },

    /// A replacement was requested while no correction is shown.
    #[error("no correction is currently shown")]
    NoActiveCorrection,

    /// The requested replacement index does not exist.
    #[error("replacement {index} requested, correction offers {available}")]
    UnknownReplacement { index: usize, available: usize },

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// A failure reported by the external linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintError {
    message: String,
}

impl LintError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lint failed: {}", self.message)
    }
}

impl std::error::Error for LintError {}
