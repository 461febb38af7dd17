//! Typed input events for the overlay.
//!
//! The host translates its native event stream into [`OverlayEvent`]s and
//! feeds them to [`OverlayWidget::handle_event`](crate::OverlayWidget::handle_event)
//! together with the current time. Pointer positions are in client
//! coordinates; the overlay maps them into surface-local coordinates using
//! the latest [`SurfaceGeometry`].

use korrect_render::{MirrorStyle, Point, Rect};

/// Where the editable surface sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceGeometry {
    /// Client position of the surface's top-left border corner.
    pub origin: Point,
    /// How far the surface content is scrolled.
    pub scroll_offset: Point,
}

impl SurfaceGeometry {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            scroll_offset: Point::ZERO,
        }
    }

    pub fn with_scroll_offset(mut self, offset: Point) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Client coordinates to surface-local content coordinates.
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(
            client.x - self.origin.x + self.scroll_offset.x,
            client.y - self.origin.y + self.scroll_offset.y,
        )
    }

    /// Surface-local content coordinates to client coordinates.
    pub fn to_client(&self, local: Point) -> Point {
        Point::new(
            local.x + self.origin.x - self.scroll_offset.x,
            local.y + self.origin.y - self.scroll_offset.y,
        )
    }

    /// A surface-local rectangle in client coordinates.
    pub fn to_client_rect(&self, rect: Rect) -> Rect {
        let origin = self.to_client(rect.origin);
        Rect::new(origin.x, origin.y, rect.width(), rect.height())
    }
}

/// Layout state of the live surface at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSnapshot {
    pub style: MirrorStyle,
    pub geometry: SurfaceGeometry,
}

impl SurfaceSnapshot {
    pub fn new(style: MirrorStyle, geometry: SurfaceGeometry) -> Self {
        Self { style, geometry }
    }
}

/// An input event routed to the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// A key went down in the surface. The text may not have changed yet.
    KeyDown,
    /// The surface text changed.
    Input { text: String },
    /// The pointer moved over the surface.
    PointerMove { position: Point },
    /// The pointer left the surface.
    PointerLeave,
    /// The pointer entered the popup.
    PopupPointerEnter,
    /// The pointer left the popup.
    PopupPointerLeave,
    /// The surface's geometry or style changed.
    Resize { snapshot: SurfaceSnapshot },
    /// Layout inputs changed without a resize, e.g. a font finished loading.
    RelayoutRequested,
    /// A popup replacement row was activated.
    ApplyReplacement { index: usize },
}

impl OverlayEvent {
    /// Short name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            OverlayEvent::KeyDown => "key_down",
            OverlayEvent::Input { .. } => "input",
            OverlayEvent::PointerMove { .. } => "pointer_move",
            OverlayEvent::PointerLeave => "pointer_leave",
            OverlayEvent::PopupPointerEnter => "popup_pointer_enter",
            OverlayEvent::PopupPointerLeave => "popup_pointer_leave",
            OverlayEvent::Resize { .. } => "resize",
            OverlayEvent::RelayoutRequested => "relayout_requested",
            OverlayEvent::ApplyReplacement { .. } => "apply_replacement",
        }
    }

    /// Whether the event belongs to the text-change path.
    pub fn is_text_event(&self) -> bool {
        matches!(self, OverlayEvent::KeyDown | OverlayEvent::Input { .. })
    }

    /// Whether the event is pointer movement over the surface or popup.
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            OverlayEvent::PointerMove { .. }
                | OverlayEvent::PointerLeave
                | OverlayEvent::PopupPointerEnter
                | OverlayEvent::PopupPointerLeave
        )
    }
}
