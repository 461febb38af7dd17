//! Core plumbing for korrect.
//!
//! This crate provides the host-independent building blocks the overlay
//! engine is assembled from:
//!
//! - **Timers**: cancelable deferred tasks and trailing-edge debouncers,
//!   driven by an explicit `Instant` supplied by the host event loop
//! - **Signals**: direct slot invocation for outbound notifications
//! - **Logging**: tracing targets and performance spans
//!
//! # Signal Example
//!
//! ```
//! use korrect_core::Signal;
//!
//! let corrected = Signal::<String>::new();
//! corrected.connect(|text| println!("new text: {text}"));
//! corrected.emit("I have a pen".to_string());
//! ```

mod error;
pub mod logging;
pub mod signal;
mod timer;

pub use error::{Result, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use timer::{Debouncer, DeferredTask};
