//! Text measurement for the mirror clone.
//!
//! The overlay never asks "which rectangles does range `[a, b)` occupy"
//! directly. Instead a [`LayoutHost`] lays out a prefix of the text followed
//! by a growable fragment, and reports the box the fragment landed in. This is
//! the only measurement primitive the overlay relies on.
//!
//! Two hosts are provided:
//!
//! - [`GridLayoutHost`]: every grapheme cluster takes a fixed advance. Fits
//!   terminal surfaces and gives exact, font-independent numbers in tests.
//! - [`CosmicLayoutHost`]: real shaping and line breaking through
//!   `cosmic-text`, for surfaces rendered with proportional fonts.
//!
//! # Example
//!
//! ```
//! use korrect_render::{MirrorStyle, Rect};
//! use korrect_render::text::{GridLayoutHost, LayoutHost};
//!
//! let style = MirrorStyle::new(200.0, 100.0).with_line_height(20.0);
//! let mut host = GridLayoutHost::with_advance(10.0);
//!
//! let rect = host.fragment_box(&style, "I ", "has").unwrap();
//! assert_eq!(rect, Rect::new(20.0, 0.0, 30.0, 20.0));
//! ```

mod cosmic;
mod font;
mod grid;

pub use cosmic::CosmicLayoutHost;
pub use font::{Font, FontFamily, FontStyle, FontWeight};
pub use grid::GridLayoutHost;

use crate::error::{MeasureError, MeasureResult};
use crate::style::MirrorStyle;
use crate::types::Rect;

/// Host text-measurement capability.
///
/// Implementations lay out `before` immediately followed by `fragment` inside
/// a box styled by `style`, and return the bounding box of `fragment` in
/// coordinates relative to the border box's top-left corner.
///
/// A fragment spanning several visual lines yields the union of its line
/// boxes. An empty fragment yields a zero-width caret box, one line tall, at
/// the position where the next character would land.
///
/// Measuring must not have observable side effects: the same arguments always
/// produce the same rectangle.
pub trait LayoutHost {
    fn fragment_box(
        &mut self,
        style: &MirrorStyle,
        before: &str,
        fragment: &str,
    ) -> MeasureResult<Rect>;
}

impl<H: LayoutHost + ?Sized> LayoutHost for Box<H> {
    fn fragment_box(
        &mut self,
        style: &MirrorStyle,
        before: &str,
        fragment: &str,
    ) -> MeasureResult<Rect> {
        (**self).fragment_box(style, before, fragment)
    }
}

/// Reject content units the mirror cannot size.
///
/// Control characters other than newline, carriage return and tab have no
/// defined box in a text surface.
pub fn validate_content(text: &str) -> MeasureResult<()> {
    match text
        .chars()
        .enumerate()
        .find(|(_, c)| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        Some((offset, unit)) => Err(MeasureError::UnsupportedContent { unit, offset }),
        None => Ok(()),
    }
}
