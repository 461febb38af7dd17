//! korrect - inline correction markers over editable text surfaces.
//!
//! Given a block of editable text and a list of [`Correction`]s reported by
//! an external linter, korrect works out which on-screen rectangles each
//! correction covers (including spans that wrap across lines), keeps a
//! marker over each rectangle, and shows a [`SuggestionPopup`] with the
//! rule description and replacement choices when the pointer hovers one.
//!
//! The engine never draws and never sleeps. The host:
//!
//! - translates native input into [`OverlayEvent`]s,
//! - calls [`OverlayWidget::poll`] when [`OverlayWidget::next_deadline`] passes,
//! - forwards [`LintRequest`]s to its linter and returns the answers through
//!   [`OverlayWidget::complete_lint`],
//! - draws the markers from [`OverlayWidget::labels`] and the popup rows.
//!
//! With the `tokio` feature, [`runtime::LintDriver`] runs the linter on a
//! tokio runtime and takes care of the last two steps.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use korrect::{Correction, OverlayConfig, OverlayEvent, OverlayWidget, SurfaceSnapshot};
//! use korrect_render::{MirrorStyle, Point, Rect};
//! use korrect_render::text::GridLayoutHost;
//!
//! let snapshot = SurfaceSnapshot::new(
//!     MirrorStyle::new(100.0, 60.0).with_line_height(20.0),
//!     Default::default(),
//! );
//! let mut overlay = OverlayWidget::new(
//!     GridLayoutHost::with_advance(10.0),
//!     snapshot,
//!     OverlayConfig::default(),
//! )
//! .with_text("Fix wrong words");
//!
//! // "wrong words" wraps after "wrong ", so it needs two markers.
//! overlay
//!     .update_corrections(vec![Correction::new(4, 11, "Spans two lines")])
//!     .unwrap();
//! assert_eq!(
//!     overlay.labels().labels()[0].rects(),
//!     &[Rect::new(40.0, 0.0, 60.0, 20.0), Rect::new(0.0, 20.0, 50.0, 20.0)]
//! );
//!
//! // Hovering the second line opens the popup below it.
//! overlay
//!     .handle_event(OverlayEvent::PointerMove { position: Point::new(25.0, 30.0) }, Instant::now())
//!     .unwrap();
//! assert!(overlay.popup().is_visible());
//! ```

mod config;
mod correction;
mod dispatcher;
mod error;
mod events;
pub mod hit_test;
mod label;
mod measurer;
mod overlay;
mod pipeline;
mod popup;
pub mod splitter;

#[cfg(feature = "tokio")]
pub mod runtime;

pub use config::OverlayConfig;
pub use correction::{Correction, Replacement, Rule, corrections_from_json, merge_duplicates};
pub use dispatcher::{DispatchResult, EventDispatcher};
pub use error::{LintError, OverlayError, OverlayResult};
pub use events::{OverlayEvent, SurfaceGeometry, SurfaceSnapshot};
pub use hit_test::Hit;
pub use label::{Label, LabelStore, Marker, MarkerId};
pub use measurer::RectangleMeasurer;
pub use overlay::{CorrectionApplied, LintFailure, LintOutcome, OverlayWidget, PollOutcome};
pub use pipeline::{LintDisposition, LintRequest, LintTicket, UpdatePipeline};
pub use popup::{PopupRow, PopupState, SuggestionPopup};

/// Convenient imports for hosts embedding the overlay.
pub mod prelude {
    pub use crate::{
        Correction, LintError, OverlayConfig, OverlayEvent, OverlayWidget, SurfaceGeometry,
        SurfaceSnapshot,
    };
    pub use korrect_render::text::{CosmicLayoutHost, GridLayoutHost, LayoutHost};
    pub use korrect_render::{MirrorStyle, Point, Rect};
}
