//! Event routing for the overlay.
//!
//! Every inbound event goes through [`EventDispatcher::dispatch`], which
//! routes it to exactly one path:
//!
//! | Event                                   | Path                         |
//! |-----------------------------------------|------------------------------|
//! | `KeyDown`, `Input`                      | text debounce                |
//! | `PointerMove`                           | hit tester, then popup       |
//! | `PointerLeave`, `PopupPointerLeave`     | popup hide delay             |
//! | `PopupPointerEnter`                     | popup hide cancel            |
//! | `Resize`                                | resize debounce              |
//! | `RelayoutRequested`                     | immediate re-split           |
//! | `ApplyReplacement`                      | replacement application      |

use std::time::Instant;

use korrect_core::logging::targets;
use korrect_render::text::LayoutHost;

use crate::error::OverlayResult;
use crate::events::OverlayEvent;
use crate::overlay::OverlayWidget;

/// Result of dispatching an event to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// The event changed overlay state.
    Accepted,
    /// The event had nothing to act on, e.g. a pointer move over no label.
    Ignored,
}

impl DispatchResult {
    /// Check if the event was handled.
    pub fn was_handled(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Routes typed events to the overlay's components.
pub struct EventDispatcher;

impl EventDispatcher {
    /// Dispatch `event`, observed at `now`, to `overlay`.
    ///
    /// Errors come only from relayout and replacement application; pointer
    /// and text events never fail.
    pub fn dispatch<H: LayoutHost>(
        overlay: &mut OverlayWidget<H>,
        event: OverlayEvent,
        now: Instant,
    ) -> OverlayResult<DispatchResult> {
        tracing::trace!(target: targets::OVERLAY, event = event.name(), "dispatching event");

        let result = match event {
            OverlayEvent::KeyDown => overlay.on_text_event(None, now),
            OverlayEvent::Input { text } => overlay.on_text_event(Some(text), now),
            OverlayEvent::PointerMove { position } => overlay.on_pointer_move(position, now),
            OverlayEvent::PointerLeave => overlay.on_pointer_leave(now),
            OverlayEvent::PopupPointerEnter => overlay.on_popup_enter(),
            OverlayEvent::PopupPointerLeave => overlay.on_popup_leave(now),
            OverlayEvent::Resize { snapshot } => overlay.on_resize(snapshot, now),
            OverlayEvent::RelayoutRequested => {
                overlay.relayout()?;
                DispatchResult::Accepted
            }
            OverlayEvent::ApplyReplacement { index } => {
                overlay.apply_replacement(index)?;
                DispatchResult::Accepted
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_result() {
        assert!(DispatchResult::Accepted.was_handled());
        assert!(!DispatchResult::Ignored.was_handled());
    }
}
