//! Rectangle Measurer: the hidden mirror clone of the editable surface.

use korrect_core::logging::targets;
use korrect_render::text::LayoutHost;
use korrect_render::{MeasureResult, MirrorStyle, Rect};

/// Owns the mirror style and measures where grown text lands.
///
/// The style is a copy of the live surface's layout-affecting properties and
/// is only replaced through [`sync_style`](Self::sync_style). Measurement
/// never mutates anything a caller can observe, so repeated calls with the
/// same arguments return the same rectangle.
#[derive(Debug)]
pub struct RectangleMeasurer<H> {
    host: H,
    style: MirrorStyle,
    line_height: Option<f32>,
}

impl<H: LayoutHost> RectangleMeasurer<H> {
    pub fn new(host: H, style: MirrorStyle) -> Self {
        Self {
            host,
            style,
            line_height: None,
        }
    }

    /// The mirror style currently in effect.
    pub fn style(&self) -> &MirrorStyle {
        &self.style
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to load fonts.
    ///
    /// Call [`sync_style`](Self::sync_style) afterwards if the change
    /// affects layout.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Re-derive the mirror from the live surface's style.
    ///
    /// Drops the cached line height even when the style is unchanged, since
    /// the host's fonts may have changed underneath it.
    pub fn sync_style(&mut self, style: MirrorStyle) {
        tracing::debug!(
            target: targets::MEASURE,
            width = style.width,
            height = style.height,
            "mirror style synced"
        );
        self.style = style;
        self.line_height = None;
    }

    /// Box of `fragment` when laid out right after `before`.
    pub fn measure(&mut self, before: &str, fragment: &str) -> MeasureResult<Rect> {
        let rect = self.host.fragment_box(&self.style, before, fragment)?;
        tracing::trace!(
            target: targets::MEASURE,
            before_len = before.len(),
            fragment_len = fragment.len(),
            x = rect.left(),
            y = rect.top(),
            width = rect.width(),
            height = rect.height(),
            "measured fragment"
        );
        Ok(rect)
    }

    /// Zero-width growth marker placed right after `prefix`.
    pub fn caret_after(&mut self, prefix: &str) -> MeasureResult<Rect> {
        self.measure(prefix, "")
    }

    /// Height of one mirror line, cached until the next style sync.
    pub fn line_height(&mut self) -> MeasureResult<f32> {
        if let Some(height) = self.line_height {
            return Ok(height);
        }
        let height = self.measure("", "a")?.height();
        self.line_height = Some(height);
        Ok(height)
    }

    /// Cached line height without measuring.
    pub fn cached_line_height(&self) -> Option<f32> {
        self.line_height
    }
}
