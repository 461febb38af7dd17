//! Hit Tester: pointer position to label.
//!
//! Containment is strict: a point on any rectangle edge does not match.
//! Labels are scanned in store order and the first match wins, so where two
//! corrections overlap the one reported first by the linter takes the pointer.

use std::sync::Arc;

use korrect_core::logging::targets;
use korrect_render::{Point, Rect};

use crate::correction::Correction;
use crate::label::LabelStore;

/// The label under the pointer.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Index of the label in store order.
    pub index: usize,
    pub correction: Arc<Correction>,
    /// The rectangle that contains the pointer.
    pub rect: Rect,
}

/// Find the first label with a rectangle strictly containing `point`.
///
/// `point` is in surface-local coordinates.
pub fn hit_test(labels: &LabelStore, point: Point) -> Option<Hit> {
    labels
        .labels()
        .iter()
        .enumerate()
        .find_map(|(index, label)| {
            label.rect_at(point).map(|rect| Hit {
                index,
                correction: label.correction().clone(),
                rect,
            })
        })
}

/// Hit test and settle highlight state for a pointer move.
///
/// Highlights of every non-matching label are cleared before the matching
/// label is highlighted. Runs on every move whether or not anything matched.
pub fn update_highlight(labels: &mut LabelStore, point: Point) -> Option<Hit> {
    let hit = hit_test(labels, point);
    let matched = hit.as_ref().map(|hit| hit.index);

    for index in 0..labels.len() {
        if Some(index) != matched {
            labels.set_highlight(index, false);
        }
    }
    if let Some(index) = matched {
        labels.set_highlight(index, true);
    }

    tracing::trace!(
        target: targets::HIT_TEST,
        x = point.x,
        y = point.y,
        matched = ?matched,
        "pointer hit test"
    );
    hit
}

/// Clear every highlight.
pub fn clear_highlight(labels: &mut LabelStore) {
    for index in 0..labels.len() {
        labels.set_highlight(index, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurer::RectangleMeasurer;
    use korrect_render::MirrorStyle;
    use korrect_render::text::GridLayoutHost;

    fn store(corrections: &[Arc<Correction>]) -> LabelStore {
        let mut measurer = RectangleMeasurer::new(
            GridLayoutHost::with_advance(10.0),
            MirrorStyle::new(100.0, 200.0).with_line_height(20.0),
        );
        let mut labels = LabelStore::new();
        labels
            .rebuild(&mut measurer, "Fix wrong words", corrections)
            .unwrap();
        labels
    }

    #[test]
    fn test_boundary_does_not_match() {
        let fix = Arc::new(Correction::new(0, 3, "a"));
        let labels = store(&[fix]);
        // "Fix" occupies (0, 0)-(30, 20).
        assert!(hit_test(&labels, Point::new(0.0, 10.0)).is_none());
        assert!(hit_test(&labels, Point::new(30.0, 10.0)).is_none());
        assert!(hit_test(&labels, Point::new(15.0, 0.0)).is_none());
        assert!(hit_test(&labels, Point::new(15.0, 20.0)).is_none());
        assert!(hit_test(&labels, Point::new(15.0, 10.0)).is_some());
    }

    #[test]
    fn test_matches_second_line_segment() {
        let span = Arc::new(Correction::new(4, 11, "b"));
        let labels = store(&[span.clone()]);
        let hit = hit_test(&labels, Point::new(25.0, 30.0)).unwrap();
        assert!(Arc::ptr_eq(&hit.correction, &span));
        assert_eq!(hit.rect, Rect::new(0.0, 20.0, 50.0, 20.0));
    }

    #[test]
    fn test_first_label_wins_on_overlap() {
        let outer = Arc::new(Correction::new(4, 5, "outer"));
        let inner = Arc::new(Correction::new(5, 2, "inner"));
        let labels = store(&[outer.clone(), inner]);
        let hit = hit_test(&labels, Point::new(55.0, 10.0)).unwrap();
        assert!(Arc::ptr_eq(&hit.correction, &outer));
    }

    #[test]
    fn test_highlight_follows_pointer() {
        let a = Arc::new(Correction::new(0, 3, "a"));
        let b = Arc::new(Correction::new(4, 5, "b"));
        let mut labels = store(&[a, b]);

        update_highlight(&mut labels, Point::new(15.0, 10.0));
        assert!(labels.is_highlighted(0));
        assert!(!labels.is_highlighted(1));

        update_highlight(&mut labels, Point::new(55.0, 10.0));
        assert!(!labels.is_highlighted(0));
        assert!(labels.is_highlighted(1));

        assert!(update_highlight(&mut labels, Point::new(500.0, 500.0)).is_none());
        assert!(!labels.is_highlighted(0));
        assert!(!labels.is_highlighted(1));
    }
}
