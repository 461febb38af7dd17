//! Geometry and text measurement for korrect.
//!
//! This crate holds everything the overlay needs to know about where text
//! lands on screen:
//!
//! - **Geometry**: [`Point`], [`Size`] and [`Rect`] in surface-local pixels
//! - **Mirror style**: [`MirrorStyle`], the layout-affecting properties copied
//!   from the live editable surface into the hidden measurement clone
//! - **Measurement**: the [`text::LayoutHost`] trait and its grid and
//!   cosmic-text implementations
//!
//! # Example
//!
//! ```
//! use korrect_render::{MirrorStyle, Rect};
//! use korrect_render::text::{GridLayoutHost, LayoutHost};
//!
//! let style = MirrorStyle::new(100.0, 60.0).with_line_height(20.0);
//! let mut host = GridLayoutHost::with_advance(10.0);
//!
//! // The fragment wraps past the 100px line, so its box spans two lines.
//! let rect = host.fragment_box(&style, "Fix ", "wrong w").unwrap();
//! assert_eq!(rect, Rect::new(0.0, 0.0, 100.0, 40.0));
//! ```

mod error;
mod style;
pub mod text;
mod types;

pub use error::{MeasureError, MeasureResult};
pub use style::{
    BoxSizing, Edges, HorizontalAlign, MirrorStyle, OverflowWrap, TextDirection, WhiteSpace,
    WordBreak, WrapMode,
};
pub use types::{Point, Rect, Size};
