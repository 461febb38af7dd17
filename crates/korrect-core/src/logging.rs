//! Logging facilities for korrect.
//!
//! korrect uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_max_level(tracing::Level::DEBUG)
//!     .init();
//! ```
//!
//! Every subsystem logs under its own target so it can be filtered with
//! `RUST_LOG`-style directives, e.g. `korrect::splitter=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Timer and debounce bookkeeping.
    pub const TIMER: &str = "korrect::timer";
    /// Signal emission.
    pub const SIGNAL: &str = "korrect::signal";
    /// Mirror measurement.
    pub const MEASURE: &str = "korrect::measure";
    /// Range splitting.
    pub const SPLITTER: &str = "korrect::splitter";
    /// Label store rebuilds.
    pub const LABELS: &str = "korrect::labels";
    /// Pointer hit testing.
    pub const HIT_TEST: &str = "korrect::hit_test";
    /// Suggestion popup state machine.
    pub const POPUP: &str = "korrect::popup";
    /// Debounced update pipeline.
    pub const PIPELINE: &str = "korrect::pipeline";
    /// Overlay widget entry points.
    pub const OVERLAY: &str = "korrect::overlay";
    /// Duration spans for synchronous passes.
    pub const PERF: &str = "korrect::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time synchronous passes such as a label rebuild.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "korrect::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
