//! Error types for korrect core.

use std::fmt;

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer has nothing scheduled.
    NotPending {
        /// Name of the timer that was queried.
        name: &'static str,
    },
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPending { name } => write!(f, "Timer '{name}' has nothing scheduled"),
        }
    }
}

impl std::error::Error for TimerError {}

/// A specialized Result type for core timer operations.
pub type Result<T> = std::result::Result<T, TimerError>;
