//! The overlay widget: one instance per editable surface.
//!
//! [`OverlayWidget`] owns the mirror, the labels, the popup and the update
//! pipeline of a single surface. It is driven entirely by the host:
//!
//! 1. Feed native events through [`handle_event`](OverlayWidget::handle_event).
//! 2. Call [`poll`](OverlayWidget::poll) when
//!    [`next_deadline`](OverlayWidget::next_deadline) passes. A returned
//!    [`LintRequest`] is also emitted on `change_requested`.
//! 3. Hand the linter's answer back with
//!    [`complete_lint`](OverlayWidget::complete_lint).
//! 4. Draw [`labels`](OverlayWidget::labels) markers and the popup rows.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use korrect::{Correction, OverlayConfig, OverlayEvent, OverlayWidget, SurfaceSnapshot};
//! use korrect_render::MirrorStyle;
//! use korrect_render::text::GridLayoutHost;
//!
//! let snapshot = SurfaceSnapshot::new(
//!     MirrorStyle::new(300.0, 100.0).with_line_height(20.0),
//!     Default::default(),
//! );
//! let mut overlay = OverlayWidget::new(
//!     GridLayoutHost::with_advance(10.0),
//!     snapshot,
//!     OverlayConfig::default(),
//! );
//!
//! let t0 = Instant::now();
//! overlay
//!     .handle_event(OverlayEvent::Input { text: "I has a pen".into() }, t0)
//!     .unwrap();
//!
//! let request = overlay
//!     .poll(t0 + Duration::from_millis(300))
//!     .lint_request
//!     .unwrap();
//! let corrections = vec![Correction::new(2, 3, "Agreement").with_replacement("have")];
//! overlay.complete_lint(request.ticket, Ok(corrections)).unwrap();
//!
//! assert_eq!(overlay.labels().len(), 1);
//! assert!(!overlay.is_busy());
//! ```

use std::sync::Arc;
use std::time::Instant;

use korrect_core::logging::targets;
use korrect_core::{PerfSpan, Signal};
use korrect_render::text::LayoutHost;
use korrect_render::{Point, Rect};

use crate::config::OverlayConfig;
use crate::correction::{Correction, merge_duplicates, same_correction};
use crate::dispatcher::{DispatchResult, EventDispatcher};
use crate::error::{LintError, OverlayError, OverlayResult};
use crate::events::{OverlayEvent, SurfaceGeometry, SurfaceSnapshot};
use crate::hit_test;
use crate::label::LabelStore;
use crate::measurer::RectangleMeasurer;
use crate::pipeline::{LintDisposition, LintRequest, LintTicket, UpdatePipeline};
use crate::popup::SuggestionPopup;
use crate::splitter::byte_index;

/// Emitted after a replacement was spliced into the text.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionApplied {
    pub correction: Arc<Correction>,
    /// The replacement value inserted.
    pub replacement: String,
    /// Full text after the replacement.
    pub text: String,
    /// Text revision after the replacement.
    pub revision: u64,
}

/// Emitted when the linter reports a failure for the latest request.
#[derive(Debug, Clone, PartialEq)]
pub struct LintFailure {
    pub ticket: LintTicket,
    pub error: LintError,
}

/// What happened to a lint completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintOutcome {
    /// The corrections replaced the label set.
    Applied { labels: usize },
    /// The completion was stale and nothing changed.
    Discarded(LintDisposition),
    /// The linter failed; the previous labels stay displayed.
    Failed,
}

/// Work done by one [`OverlayWidget::poll`].
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// A lint request issued because the text debounce elapsed.
    pub lint_request: Option<LintRequest>,
    /// Result of a relayout triggered by the resize debounce: the number of
    /// labels rebuilt, or why the previous labels were kept.
    pub relayout: Option<OverlayResult<usize>>,
    /// Whether the popup's hide delay elapsed.
    pub popup_hidden: bool,
}

/// The corrections currently displayed and the text they refer to.
#[derive(Debug, Default)]
struct CorrectionBatch {
    revision: u64,
    text: String,
    corrections: Vec<Arc<Correction>>,
}

/// Inline correction overlay for one editable surface.
pub struct OverlayWidget<H> {
    config: OverlayConfig,
    measurer: RectangleMeasurer<H>,
    labels: LabelStore,
    popup: SuggestionPopup,
    pipeline: UpdatePipeline,
    geometry: SurfaceGeometry,
    text: String,
    revision: u64,
    batch: CorrectionBatch,
    busy_reported: bool,

    /// One emission per debounced text-change cycle.
    pub change_requested: Signal<LintRequest>,
    /// A replacement was applied; the text should be linted again.
    pub corrected: Signal<CorrectionApplied>,
    /// The loading state flipped.
    pub busy_changed: Signal<bool>,
    /// The linter failed for the latest request.
    pub lint_failed: Signal<LintFailure>,
}

impl<H: LayoutHost> OverlayWidget<H> {
    /// Create an overlay for a surface with the given layout state.
    pub fn new(host: H, snapshot: SurfaceSnapshot, config: OverlayConfig) -> Self {
        Self {
            measurer: RectangleMeasurer::new(host, snapshot.style),
            labels: LabelStore::new(),
            popup: SuggestionPopup::new(config.hide_delay()),
            pipeline: UpdatePipeline::new(config.text_debounce(), config.resize_debounce()),
            geometry: snapshot.geometry,
            text: String::new(),
            revision: 0,
            batch: CorrectionBatch::default(),
            busy_reported: false,
            config,
            change_requested: Signal::new(),
            corrected: Signal::new(),
            busy_changed: Signal::new(),
            lint_failed: Signal::new(),
        }
    }

    /// Start with `text` already in the surface.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    // =========================================================================
    // Host entry points
    // =========================================================================

    /// Route one input event.
    pub fn handle_event(
        &mut self,
        event: OverlayEvent,
        now: Instant,
    ) -> OverlayResult<DispatchResult> {
        EventDispatcher::dispatch(self, event, now)
    }

    /// Run every timer that has elapsed by `now`.
    ///
    /// A fired resize lays the markers out against the text of the held
    /// batch. After an edit they keep that text's geometry until the next
    /// batch is installed.
    pub fn poll(&mut self, now: Instant) -> PollOutcome {
        let popup_hidden = self.popup.poll(now);

        let relayout = self.pipeline.poll_resize(now).map(|snapshot| {
            self.geometry = snapshot.geometry;
            self.measurer.sync_style(snapshot.style);
            let result = self.resplit();
            self.pipeline.relayout_done();
            result
        });

        let lint_request = if self.pipeline.poll_text(now) {
            Some(self.issue_lint())
        } else {
            None
        };

        self.sync_busy();
        PollOutcome {
            lint_request,
            relayout,
            popup_hidden,
        }
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.popup.deadline(), self.pipeline.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Issue a lint request for the current text right away.
    ///
    /// Drops any pending text debounce. Typically called from a
    /// `corrected` slot's owner after a replacement.
    pub fn request_lint_now(&mut self) -> LintRequest {
        self.pipeline.cancel_text();
        let request = self.issue_lint();
        self.sync_busy();
        request
    }

    /// Deliver the linter's answer for `ticket`.
    ///
    /// Stale answers are discarded. A failure keeps the previous labels and
    /// is emitted on `lint_failed`. A measurement error while building the new
    /// labels is returned, with the previous labels kept.
    pub fn complete_lint(
        &mut self,
        ticket: LintTicket,
        result: Result<Vec<Correction>, LintError>,
    ) -> OverlayResult<LintOutcome> {
        let disposition = self.pipeline.resolve(ticket, self.revision);
        let outcome = match (disposition, result) {
            (LintDisposition::Current, Ok(corrections)) => self
                .install_batch(corrections)
                .map(|labels| LintOutcome::Applied { labels }),
            (LintDisposition::Current, Err(error)) => {
                tracing::warn!(
                    target: targets::OVERLAY,
                    ticket = ticket.sequence(),
                    %error,
                    "linter failed, keeping previous labels"
                );
                self.lint_failed.emit(LintFailure { ticket, error });
                Ok(LintOutcome::Failed)
            }
            (stale, _) => Ok(LintOutcome::Discarded(stale)),
        };
        self.sync_busy();
        outcome
    }

    /// Replace the corrections for the current text directly.
    ///
    /// Duplicates for the same span are merged. Returns the number of labels.
    pub fn update_corrections(&mut self, corrections: Vec<Correction>) -> OverlayResult<usize> {
        let result = self.install_batch(corrections);
        self.pipeline.settle();
        self.sync_busy();
        result
    }

    /// Re-derive the mirror from the current style and re-split every held
    /// correction, without linting.
    ///
    /// A resize still waiting for its quiet interval is applied right away.
    /// Markers follow the text their batch was produced for, so after an edit
    /// they lag behind the surface until the next batch arrives.
    pub fn relayout(&mut self) -> OverlayResult<usize> {
        let style = match self.pipeline.flush_resize() {
            Some(snapshot) => {
                self.geometry = snapshot.geometry;
                snapshot.style
            }
            None => self.measurer.style().clone(),
        };
        self.measurer.sync_style(style);
        let result = self.resplit();
        self.pipeline.relayout_done();
        self.sync_busy();
        result
    }

    /// Apply replacement `index` of the correction shown in the popup.
    ///
    /// Fails without changing anything if no popup is shown, the index is
    /// unknown, the correction's batch was produced for another revision of
    /// the text, or its span no longer fits the text.
    pub fn apply_replacement(&mut self, index: usize) -> OverlayResult<CorrectionApplied> {
        let correction = self
            .popup
            .correction()
            .cloned()
            .ok_or(OverlayError::NoActiveCorrection)?;
        let replacement = correction
            .replacements
            .get(index)
            .map(|r| r.value.clone())
            .ok_or(OverlayError::UnknownReplacement {
                index,
                available: correction.replacements.len(),
            })?;

        if self.batch.revision != self.revision {
            tracing::warn!(
                target: targets::OVERLAY,
                batch_revision = self.batch.revision,
                text_revision = self.revision,
                "rejected replacement for outdated correction"
            );
            return Err(OverlayError::StaleCorrection {
                batch_revision: self.batch.revision,
                text_revision: self.revision,
            });
        }
        let text_len = self.text.chars().count();
        if correction.end() > text_len {
            return Err(OverlayError::OffsetOutOfBounds {
                offset: correction.offset,
                length: correction.length,
                text_len,
            });
        }

        self.popup.hide_now();

        let start = byte_index(&self.text, correction.offset);
        let end = byte_index(&self.text, correction.end());
        self.text.replace_range(start..end, &replacement);
        self.revision += 1;

        self.labels.remove_for(&correction);
        self.batch
            .corrections
            .retain(|c| !same_correction(c, &correction));

        self.pipeline.expect_lint();
        self.sync_busy();

        tracing::info!(
            target: targets::OVERLAY,
            offset = correction.offset,
            length = correction.length,
            replacement = %replacement,
            "replacement applied"
        );
        let applied = CorrectionApplied {
            correction,
            replacement,
            text: self.text.clone(),
            revision: self.revision,
        };
        self.corrected.emit(applied.clone());
        Ok(applied)
    }

    /// Replace the text without going through the debounce.
    ///
    /// Returns `true` if the text changed. Current labels stay displayed but
    /// can no longer be applied until a fresh batch arrives.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.revision += 1;
        true
    }

    /// Update how far the surface content is scrolled.
    pub fn set_scroll_offset(&mut self, offset: Point) {
        self.geometry.scroll_offset = offset;
    }

    /// Replace the configuration. Timer intervals apply from the next event.
    pub fn set_config(&mut self, config: OverlayConfig) {
        self.popup.set_hide_delay(config.hide_delay());
        self.pipeline
            .set_intervals(config.text_debounce(), config.resize_debounce());
        self.config = config;
        self.sync_busy();
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Incremented on every text change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }

    pub fn popup(&self) -> &SuggestionPopup {
        &self.popup
    }

    pub fn measurer(&self) -> &RectangleMeasurer<H> {
        &self.measurer
    }

    /// Mutable access to the mirror, e.g. to load fonts into its host.
    /// Follow up with [`relayout`](Self::relayout).
    pub fn measurer_mut(&mut self) -> &mut RectangleMeasurer<H> {
        &mut self.measurer
    }

    /// Corrections currently held, in batch order.
    pub fn corrections(&self) -> &[Arc<Correction>] {
        &self.batch.corrections
    }

    /// Text revision the held corrections were produced for.
    pub fn batch_revision(&self) -> u64 {
        self.batch.revision
    }

    /// Whether a lint or relayout is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pipeline.is_busy()
    }

    /// Whether the loading indicator should be drawn.
    pub fn spinner_visible(&self) -> bool {
        self.is_busy() && !self.config.hide_spinner
    }

    /// Height of one mirror line, measured once per layout.
    pub fn line_height(&mut self) -> OverlayResult<f32> {
        Ok(self.measurer.line_height()?)
    }

    /// Popup box in client coordinates, if shown.
    pub fn popup_bounds(&mut self) -> OverlayResult<Option<Rect>> {
        if !self.popup.is_visible() {
            return Ok(None);
        }
        let row_height = self.line_height()?;
        let local = self.popup.bounds(
            self.config.popup_offset_x,
            self.config.popup_width,
            row_height,
        );
        Ok(local.map(|rect| self.geometry.to_client_rect(rect)))
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    pub(crate) fn on_text_event(&mut self, text: Option<String>, now: Instant) -> DispatchResult {
        if let Some(text) = text {
            self.set_text(text);
        }
        self.pipeline.text_changed(now);
        self.sync_busy();
        DispatchResult::Accepted
    }

    pub(crate) fn on_pointer_move(&mut self, position: Point, now: Instant) -> DispatchResult {
        let local = self.geometry.to_local(position);
        match hit_test::update_highlight(&mut self.labels, local) {
            Some(hit) => {
                self.popup.show(hit.correction, hit.rect);
                DispatchResult::Accepted
            }
            None => {
                self.popup.request_hide(now);
                DispatchResult::Ignored
            }
        }
    }

    pub(crate) fn on_pointer_leave(&mut self, now: Instant) -> DispatchResult {
        hit_test::clear_highlight(&mut self.labels);
        self.hide_later(now)
    }

    pub(crate) fn on_popup_enter(&mut self) -> DispatchResult {
        if self.popup.cancel_hide() {
            DispatchResult::Accepted
        } else {
            DispatchResult::Ignored
        }
    }

    pub(crate) fn on_popup_leave(&mut self, now: Instant) -> DispatchResult {
        self.hide_later(now)
    }

    pub(crate) fn on_resize(&mut self, snapshot: SurfaceSnapshot, now: Instant) -> DispatchResult {
        self.geometry = snapshot.geometry;
        self.pipeline.resized(now, snapshot);
        self.sync_busy();
        DispatchResult::Accepted
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn hide_later(&mut self, now: Instant) -> DispatchResult {
        if self.popup.is_visible() {
            self.popup.request_hide(now);
            DispatchResult::Accepted
        } else {
            DispatchResult::Ignored
        }
    }

    fn issue_lint(&mut self) -> LintRequest {
        let request = self.pipeline.issue(self.text.clone(), self.revision);
        self.change_requested.emit(request.clone());
        request
    }

    /// Build labels for a new batch against the current text.
    fn install_batch(&mut self, corrections: Vec<Correction>) -> OverlayResult<usize> {
        let corrections: Vec<Arc<Correction>> = merge_duplicates(corrections)
            .into_iter()
            .map(Arc::new)
            .collect();

        self.labels
            .rebuild(&mut self.measurer, &self.text, &corrections)?;
        self.popup.hide_now();
        self.batch = CorrectionBatch {
            revision: self.revision,
            text: self.text.clone(),
            corrections,
        };

        tracing::debug!(
            target: targets::OVERLAY,
            revision = self.revision,
            labels = self.labels.len(),
            "correction batch installed"
        );
        Ok(self.labels.len())
    }

    /// Split the held corrections again against the text they refer to,
    /// which is not the surface text once it has been edited.
    fn resplit(&mut self) -> OverlayResult<usize> {
        let _perf = PerfSpan::new("relayout");
        self.labels
            .rebuild(&mut self.measurer, &self.batch.text, &self.batch.corrections)?;
        self.popup.hide_now();
        Ok(self.labels.len())
    }

    fn sync_busy(&mut self) {
        let busy = self.pipeline.is_busy();
        if busy != self.busy_reported {
            self.busy_reported = busy;
            tracing::debug!(target: targets::OVERLAY, busy, "busy state changed");
            self.busy_changed.emit(busy);
        }
    }
}

impl<H> std::fmt::Debug for OverlayWidget<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayWidget")
            .field("revision", &self.revision)
            .field("labels", &self.labels.len())
            .field("popup_visible", &self.popup.is_visible())
            .field("busy", &self.busy_reported)
            .finish()
    }
}
