//! Suggestion Popup Controller.
//!
//! A two-state machine owning the popup's content and its hide timing:
//!
//! ```text
//!            show(c)                    show(c), already showing c
//!   Hidden ----------> Shown(c) <------------------------------+ (no re-render)
//!      ^                  |  |                                  |
//!      |   hide_now()     |  +----------------------------------+
//!      +------------------+
//!      |   request_hide() then poll() after the grace delay
//!      +------------------
//! ```
//!
//! Switching to a different correction passes through `Hidden` immediately
//! before rendering the new content, so at most one popup is ever shown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use korrect_core::DeferredTask;
use korrect_core::logging::targets;
use korrect_render::Rect;

use crate::correction::{Correction, same_correction};

/// One rendered row of the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupRow {
    /// A line of the rule description.
    Description(String),
    /// An interactive row applying the replacement at `index`.
    Replacement { index: usize, value: String },
}

/// Visibility and content of the popup.
#[derive(Debug, Clone, Default)]
pub enum PopupState {
    #[default]
    Hidden,
    Shown {
        correction: Arc<Correction>,
        /// The hovered rectangle the popup is anchored below.
        anchor: Rect,
        rows: Vec<PopupRow>,
    },
}

/// Popup state machine with a cancelable hide delay.
#[derive(Debug)]
pub struct SuggestionPopup {
    state: PopupState,
    hide_timer: DeferredTask,
    render_count: u64,
}

impl SuggestionPopup {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            state: PopupState::Hidden,
            hide_timer: DeferredTask::new("popup_hide", hide_delay),
            render_count: 0,
        }
    }

    pub fn set_hide_delay(&mut self, delay: Duration) {
        self.hide_timer.set_delay(delay);
    }

    /// Show `correction` anchored at `anchor`.
    ///
    /// Returns `true` if the popup was rendered. Showing the correction that
    /// is already visible only cancels a pending hide.
    pub fn show(&mut self, correction: Arc<Correction>, anchor: Rect) -> bool {
        self.hide_timer.cancel();

        if self.is_showing(&correction) {
            return false;
        }
        if self.is_visible() {
            self.hide_now();
        }

        let rows = build_rows(&correction);
        tracing::debug!(
            target: targets::POPUP,
            offset = correction.offset,
            rows = rows.len(),
            "popup shown"
        );
        self.state = PopupState::Shown {
            correction,
            anchor,
            rows,
        };
        self.render_count += 1;
        true
    }

    /// Start the grace delay before hiding. Restarts a pending delay.
    pub fn request_hide(&mut self, now: Instant) {
        if self.is_visible() {
            self.hide_timer.schedule(now);
        }
    }

    /// Keep the popup open, e.g. while the pointer is over it.
    pub fn cancel_hide(&mut self) -> bool {
        self.hide_timer.cancel()
    }

    /// Hide without a grace delay. Returns `true` if it was visible.
    pub fn hide_now(&mut self) -> bool {
        self.hide_timer.cancel();
        match std::mem::take(&mut self.state) {
            PopupState::Hidden => false,
            PopupState::Shown { correction, .. } => {
                tracing::debug!(target: targets::POPUP, offset = correction.offset, "popup hidden");
                true
            }
        }
    }

    /// Apply an elapsed hide delay. Returns `true` if the popup was hidden.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.hide_timer.fire_if_due(now) {
            self.hide_now()
        } else {
            false
        }
    }

    /// When the pending hide delay elapses.
    pub fn deadline(&self) -> Option<Instant> {
        self.hide_timer.deadline()
    }

    pub fn is_hide_pending(&self) -> bool {
        self.hide_timer.is_pending()
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, PopupState::Shown { .. })
    }

    /// Whether the popup currently shows exactly this correction.
    pub fn is_showing(&self, correction: &Arc<Correction>) -> bool {
        self.correction()
            .is_some_and(|shown| same_correction(shown, correction))
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn correction(&self) -> Option<&Arc<Correction>> {
        match &self.state {
            PopupState::Shown { correction, .. } => Some(correction),
            PopupState::Hidden => None,
        }
    }

    pub fn anchor(&self) -> Option<Rect> {
        match &self.state {
            PopupState::Shown { anchor, .. } => Some(*anchor),
            PopupState::Hidden => None,
        }
    }

    pub fn rows(&self) -> &[PopupRow] {
        match &self.state {
            PopupState::Shown { rows, .. } => rows.as_slice(),
            PopupState::Hidden => &[],
        }
    }

    /// How many times content has been rendered.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Popup box in surface-local coordinates: just below the anchor,
    /// shifted horizontally by `offset_x`, one `row_height` per row.
    pub fn bounds(&self, offset_x: f32, width: f32, row_height: f32) -> Option<Rect> {
        self.anchor().map(|anchor| {
            Rect::new(
                anchor.left() + offset_x,
                anchor.bottom(),
                width,
                self.rows().len() as f32 * row_height,
            )
        })
    }
}

fn build_rows(correction: &Correction) -> Vec<PopupRow> {
    let descriptions = correction
        .description_lines()
        .map(|line| PopupRow::Description(line.to_string()));
    let replacements = correction
        .replacements
        .iter()
        .enumerate()
        .map(|(index, replacement)| PopupRow::Replacement {
            index,
            value: replacement.value.clone(),
        });
    descriptions.chain(replacements).collect()
}
