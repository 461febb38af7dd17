//! Range Splitter: maps a character range to its visual line rectangles.
//!
//! The mirror can only answer "where does this grown fragment land", so the
//! span is grown one grapheme cluster at a time. While the fragment stays on
//! one line its box only widens. When a cluster pushes it onto another line
//! the box becomes taller and its bottom edge moves; the box from before that
//! cluster is then committed as one line segment, the committed text joins
//! the fixed prefix, and growth restarts with the carried-over cluster.
//!
//! ```text
//!   Accumulating --(line break)--> Committing --(carry cluster)--> Accumulating
//! ```
//!
//! The triggering cluster is re-measured as the first cluster of the next
//! segment, so nothing is lost or duplicated. The first cluster of a segment
//! is never tested for a break.

use unicode_segmentation::UnicodeSegmentation;

use korrect_core::logging::targets;
use korrect_render::text::LayoutHost;
use korrect_render::Rect;

use crate::error::{OverlayError, OverlayResult};
use crate::measurer::RectangleMeasurer;

/// Differences below this are treated as equal.
const TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
enum SplitState {
    /// Growing the current segment; `last` is its box so far.
    Accumulating { last: Option<Rect> },
    /// A break was detected at cluster `resume`; `rect` closes the segment.
    Committing { rect: Rect, resume: usize },
}

/// Whether `next` landed on a different visual line than `prev`.
///
/// Both the bottom edge and the height must change. A bottom shift alone is
/// a sub-pixel adjustment, not a wrap.
pub fn is_line_break(prev: &Rect, next: &Rect) -> bool {
    (prev.bottom() - next.bottom()).abs() > TOLERANCE
        && (prev.height() - next.height()).abs() > TOLERANCE
}

/// Split `text[offset, offset + length)` (in characters) into one rectangle
/// per visual line it occupies, in reading order.
///
/// Always returns at least one rectangle; an empty span yields a zero-width
/// rectangle at the offset position.
pub fn split<H: LayoutHost>(
    measurer: &mut RectangleMeasurer<H>,
    text: &str,
    offset: usize,
    length: usize,
) -> OverlayResult<Vec<Rect>> {
    let text_len = text.chars().count();
    let end = offset.checked_add(length).filter(|end| *end <= text_len);
    let Some(end) = end else {
        return Err(OverlayError::OffsetOutOfBounds {
            offset,
            length,
            text_len,
        });
    };

    let start_byte = byte_index(text, offset);
    let end_byte = byte_index(text, end);
    // Byte offset just past each cluster of the span.
    let cluster_ends: Vec<usize> = text[start_byte..end_byte]
        .grapheme_indices(true)
        .map(|(i, cluster)| start_byte + i + cluster.len())
        .collect();

    let mut rects = Vec::new();
    let mut segment_start = start_byte;
    let mut state = SplitState::Accumulating { last: None };
    let mut index = 0;

    while index < cluster_ends.len() {
        state = match state {
            SplitState::Accumulating { last } => {
                let grown = &text[segment_start..cluster_ends[index]];
                let next = measurer.measure(&text[..segment_start], grown)?;
                match last {
                    Some(prev) if is_line_break(&prev, &next) => SplitState::Committing {
                        rect: prev,
                        resume: index,
                    },
                    _ => {
                        index += 1;
                        SplitState::Accumulating { last: Some(next) }
                    }
                }
            }
            SplitState::Committing { rect, resume } => {
                tracing::trace!(
                    target: targets::SPLITTER,
                    segment = rects.len(),
                    y = rect.top(),
                    width = rect.width(),
                    "line segment committed"
                );
                rects.push(rect);
                // A segment's first cluster is never a break, so `resume >= 1`.
                segment_start = cluster_ends[resume - 1];
                SplitState::Accumulating { last: None }
            }
        };
    }

    let last = match state {
        SplitState::Accumulating { last: Some(rect) } => rect,
        _ => measurer.caret_after(&text[..segment_start])?,
    };
    rects.push(last);

    tracing::trace!(
        target: targets::SPLITTER,
        offset,
        length,
        segments = rects.len(),
        "span split"
    );
    Ok(rects)
}

/// Byte index of the `chars`-th character, or the text length past the end.
pub(crate) fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use korrect_render::text::GridLayoutHost;
    use korrect_render::{MirrorStyle, WordBreak};

    fn measurer(width: f32) -> RectangleMeasurer<GridLayoutHost> {
        RectangleMeasurer::new(
            GridLayoutHost::with_advance(10.0),
            MirrorStyle::new(width, 200.0).with_line_height(20.0),
        )
    }

    #[test]
    fn test_single_line() {
        let mut m = measurer(300.0);
        let rects = split(&mut m, "I has a pen", 2, 3).unwrap();
        assert_eq!(rects, vec![Rect::new(20.0, 0.0, 30.0, 20.0)]);
    }

    #[test]
    fn test_word_wrap_two_segments() {
        let mut m = measurer(100.0);
        // "wrong " ends line one; "words" wraps whole onto line two.
        let rects = split(&mut m, "Fix wrong words", 4, 11).unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(40.0, 0.0, 60.0, 20.0),
                Rect::new(0.0, 20.0, 50.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_character_wrap_carries_cluster() {
        let mut m = RectangleMeasurer::new(
            GridLayoutHost::with_advance(10.0),
            MirrorStyle::new(100.0, 200.0)
                .with_line_height(20.0)
                .with_word_break(WordBreak::BreakAll),
        );
        let rects = split(&mut m, "I have a bigger pen", 9, 6).unwrap();
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], Rect::new(90.0, 0.0, 10.0, 20.0));
        assert_eq!(rects[1], Rect::new(0.0, 20.0, 50.0, 20.0));
        assert_eq!(rects[1].top() - rects[0].top(), 20.0);
    }

    #[test]
    fn test_three_lines() {
        let mut m = measurer(100.0);
        let text = "aaaaaaaaa bbbbbbbbb cc";
        let rects = split(&mut m, text, 5, 17).unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(50.0, 0.0, 50.0, 20.0),
                Rect::new(0.0, 20.0, 100.0, 20.0),
                Rect::new(0.0, 40.0, 20.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_wrapped_word_moves_without_extra_segment() {
        let mut m = measurer(100.0);
        // The sixth "b" pushes the whole word onto line two; the box moves
        // down without growing, so no segment is committed on line one.
        let rects = split(&mut m, "aaaa bbbbbb", 5, 6).unwrap();
        assert_eq!(rects, vec![Rect::new(0.0, 20.0, 60.0, 20.0)]);
    }

    #[test]
    fn test_zero_length_is_degenerate() {
        let mut m = measurer(300.0);
        let rects = split(&mut m, "I has a pen", 2, 0).unwrap();
        assert_eq!(rects, vec![Rect::new(20.0, 0.0, 0.0, 20.0)]);
    }

    #[test]
    fn test_newline_inside_span() {
        let mut m = measurer(300.0);
        let rects = split(&mut m, "ab\ncd", 0, 5).unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 0.0, 20.0, 20.0),
                Rect::new(0.0, 20.0, 20.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let mut m = measurer(300.0);
        let rects = split(&mut m, "héllo wörld", 6, 5).unwrap();
        assert_eq!(rects, vec![Rect::new(60.0, 0.0, 50.0, 20.0)]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut m = measurer(300.0);
        assert!(matches!(
            split(&mut m, "short", 3, 5),
            Err(OverlayError::OffsetOutOfBounds {
                offset: 3,
                length: 5,
                text_len: 5
            })
        ));
    }

    #[test]
    fn test_bottom_shift_without_height_change_is_not_a_break() {
        let a = Rect::new(0.0, 0.0, 10.0, 20.0);
        let shifted = Rect::new(0.0, 0.5, 12.0, 20.0);
        let wrapped = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert!(!is_line_break(&a, &shifted));
        assert!(is_line_break(&a, &wrapped));
    }
}
