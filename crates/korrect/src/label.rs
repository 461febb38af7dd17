//! Label Store: corrections, their rectangles and their visual markers.
//!
//! A [`Label`] ties one correction to the rectangles it occupies and one
//! marker per rectangle. Markers are what the presentation shell draws; they
//! live in a slot map so a marker id held by the shell goes stale instead of
//! pointing at a different marker after a rebuild.

use std::sync::Arc;

use slotmap::{SlotMap, new_key_type};

use korrect_core::PerfSpan;
use korrect_core::logging::targets;
use korrect_render::text::LayoutHost;
use korrect_render::{Point, Rect};

use crate::correction::{Correction, same_correction};
use crate::error::OverlayResult;
use crate::measurer::RectangleMeasurer;
use crate::splitter;

new_key_type! {
    /// Identifier of an attached marker.
    pub struct MarkerId;
}

/// A visual marker positioned over one line segment of a correction.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position in surface-local coordinates.
    pub rect: Rect,
    /// Whether the pointer is over this marker's correction.
    pub highlighted: bool,
}

/// One correction and its on-screen extent.
#[derive(Debug, Clone)]
pub struct Label {
    correction: Arc<Correction>,
    rects: Vec<Rect>,
    markers: Vec<MarkerId>,
}

impl Label {
    pub fn correction(&self) -> &Arc<Correction> {
        &self.correction
    }

    /// Rectangles in reading order, one per visual line.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn markers(&self) -> &[MarkerId] {
        &self.markers
    }

    /// First rectangle strictly containing `point`.
    pub fn rect_at(&self, point: Point) -> Option<Rect> {
        self.rects
            .iter()
            .copied()
            .find(|rect| rect.contains_strict(point))
    }
}

/// All labels of the current correction batch.
#[derive(Debug, Default)]
pub struct LabelStore {
    labels: Vec<Label>,
    markers: SlotMap<MarkerId, Marker>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every label with labels for `corrections`, in input order.
    ///
    /// All rectangles are computed before anything is touched: if any span
    /// fails to measure, the error is returned and the current labels stay as
    /// they are. Otherwise every old marker is detached before the first new
    /// one is attached.
    pub fn rebuild<H: LayoutHost>(
        &mut self,
        measurer: &mut RectangleMeasurer<H>,
        text: &str,
        corrections: &[Arc<Correction>],
    ) -> OverlayResult<()> {
        let _perf = PerfSpan::new("label_rebuild");

        let mut measured = Vec::with_capacity(corrections.len());
        for correction in corrections {
            match splitter::split(measurer, text, correction.offset, correction.length) {
                Ok(rects) => measured.push((correction.clone(), rects)),
                Err(err) => {
                    tracing::error!(
                        target: targets::LABELS,
                        offset = correction.offset,
                        length = correction.length,
                        error = %err,
                        "label rebuild failed, keeping previous labels"
                    );
                    return Err(err);
                }
            }
        }

        let detached = self.destroy();
        for (correction, rects) in measured {
            let markers = rects
                .iter()
                .map(|&rect| {
                    self.markers.insert(Marker {
                        rect,
                        highlighted: false,
                    })
                })
                .collect();
            self.labels.push(Label {
                correction,
                rects,
                markers,
            });
        }

        tracing::debug!(
            target: targets::LABELS,
            detached,
            labels = self.labels.len(),
            markers = self.markers.len(),
            "labels rebuilt"
        );
        Ok(())
    }

    /// Detach every marker and drop every label.
    ///
    /// Returns the number of markers detached; zero on an empty store.
    pub fn destroy(&mut self) -> usize {
        let detached = self.markers.len();
        self.markers.clear();
        self.labels.clear();
        detached
    }

    /// Remove the label for exactly this correction (by identity).
    pub fn remove_for(&mut self, correction: &Arc<Correction>) -> bool {
        let Some(index) = self
            .labels
            .iter()
            .position(|label| same_correction(&label.correction, correction))
        else {
            return false;
        };

        let label = self.labels.remove(index);
        for id in &label.markers {
            self.markers.remove(*id);
        }
        tracing::debug!(
            target: targets::LABELS,
            offset = label.correction.offset,
            markers = label.markers.len(),
            "label removed"
        );
        true
    }

    /// Labels in batch order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Look up an attached marker.
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id)
    }

    /// All attached markers.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Set the highlight of every marker of the label at `index`.
    pub(crate) fn set_highlight(&mut self, index: usize, highlighted: bool) {
        let Some(label) = self.labels.get(index) else {
            return;
        };
        for id in &label.markers {
            if let Some(marker) = self.markers.get_mut(*id) {
                marker.highlighted = highlighted;
            }
        }
    }

    /// Whether the label at `index` is highlighted.
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.labels
            .get(index)
            .and_then(|label| label.markers.first())
            .and_then(|id| self.markers.get(*id))
            .is_some_and(|marker| marker.highlighted)
    }
}
