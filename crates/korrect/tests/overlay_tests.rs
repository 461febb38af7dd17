//! Integration tests for the overlay driven through its public event API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use korrect::{
    Correction, CorrectionApplied, LintError, LintDisposition, LintOutcome, OverlayConfig,
    OverlayError, OverlayEvent, OverlayWidget, PopupRow, SurfaceGeometry, SurfaceSnapshot,
};
use korrect_render::text::GridLayoutHost;
use korrect_render::{MirrorStyle, Point, Rect};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn snapshot(width: f32) -> SurfaceSnapshot {
    SurfaceSnapshot::new(
        MirrorStyle::new(width, 100.0).with_line_height(20.0),
        SurfaceGeometry::default(),
    )
}

fn overlay(width: f32, text: &str) -> OverlayWidget<GridLayoutHost> {
    OverlayWidget::new(
        GridLayoutHost::with_advance(10.0),
        snapshot(width),
        OverlayConfig::default(),
    )
    .with_text(text)
}

fn record<T: Clone + Send + 'static>(signal: &korrect_core::Signal<T>) -> Arc<Mutex<Vec<T>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    signal.connect(move |value: &T| sink.lock().push(value.clone()));
    seen
}

fn hover(overlay: &mut OverlayWidget<GridLayoutHost>, x: f32, y: f32, now: Instant) -> bool {
    overlay
        .handle_event(
            OverlayEvent::PointerMove {
                position: Point::new(x, y),
            },
            now,
        )
        .unwrap()
        .was_handled()
}

#[test]
fn test_single_line_correction() {
    let mut overlay = overlay(300.0, "I has a pen");
    overlay
        .update_corrections(vec![Correction::new(2, 3, "Agreement").with_replacement("have")])
        .unwrap();

    let labels = overlay.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels.marker_count(), 1);
    assert_eq!(labels.labels()[0].rects(), &[Rect::new(20.0, 0.0, 30.0, 20.0)]);
}

#[test]
fn test_wrapped_correction_gets_marker_per_line() {
    let mut overlay = overlay(100.0, "Fix wrong words");
    overlay
        .update_corrections(vec![Correction::new(4, 11, "Spans two lines")])
        .unwrap();

    assert_eq!(
        overlay.labels().labels()[0].rects(),
        &[
            Rect::new(40.0, 0.0, 60.0, 20.0),
            Rect::new(0.0, 20.0, 50.0, 20.0)
        ]
    );
    assert_eq!(overlay.labels().marker_count(), 2);
}

#[test]
fn test_keystroke_burst_requests_one_lint() {
    let mut overlay = overlay(300.0, "");
    let requests = record(&overlay.change_requested);
    let t0 = Instant::now();

    let mut typed = String::new();
    for (i, ch) in "I has".chars().enumerate() {
        let at = t0 + ms(i as u64 * 50);
        typed.push(ch);
        overlay.handle_event(OverlayEvent::KeyDown, at).unwrap();
        overlay
            .handle_event(OverlayEvent::Input { text: typed.clone() }, at)
            .unwrap();
        assert!(overlay.poll(at + ms(10)).lint_request.is_none());
    }

    let last = t0 + ms(200);
    assert_eq!(overlay.next_deadline(), Some(last + ms(300)));
    assert!(overlay.poll(last + ms(299)).lint_request.is_none());
    let request = overlay.poll(last + ms(300)).lint_request.unwrap();

    assert_eq!(request.text, "I has");
    assert_eq!(requests.lock().len(), 1);
    assert_eq!(requests.lock()[0], request);
}

#[test]
fn test_hover_does_not_rerender_popup() {
    let mut overlay = overlay(300.0, "I has a pen");
    overlay
        .update_corrections(vec![
            Correction::new(2, 3, "Agreement")
                .with_replacement("have")
                .with_replacement("had"),
        ])
        .unwrap();
    let now = Instant::now();

    for x in 21..50 {
        assert!(hover(&mut overlay, x as f32, 10.0, now));
    }

    let popup = overlay.popup();
    assert_eq!(popup.render_count(), 1);
    assert_eq!(popup.anchor(), Some(Rect::new(20.0, 0.0, 30.0, 20.0)));
    assert_eq!(
        popup.rows(),
        &[
            PopupRow::Description("Agreement".into()),
            PopupRow::Replacement {
                index: 0,
                value: "have".into()
            },
            PopupRow::Replacement {
                index: 1,
                value: "had".into()
            },
        ]
    );
    assert!(overlay.labels().is_highlighted(0));
}

#[test]
fn test_rectangle_edges_are_exclusive() {
    let mut overlay = overlay(300.0, "I has a pen");
    overlay
        .update_corrections(vec![
            Correction::new(2, 3, "Agreement"),
            Correction::new(5, 1, "Extra space"),
        ])
        .unwrap();
    let now = Instant::now();

    // x = 50 is the shared edge of "has" and the following space.
    assert!(!hover(&mut overlay, 20.0, 10.0, now));
    assert!(!hover(&mut overlay, 50.0, 10.0, now));
    assert!(!hover(&mut overlay, 30.0, 0.0, now));
    assert!(!overlay.popup().is_visible());

    assert!(hover(&mut overlay, 55.0, 10.0, now));
    assert_eq!(overlay.popup().correction().unwrap().rule.description, "Extra space");
    assert!(!overlay.labels().is_highlighted(0));
    assert!(overlay.labels().is_highlighted(1));
}

#[test]
fn test_popup_hides_after_grace_delay() {
    let mut overlay = overlay(300.0, "I has a pen");
    overlay
        .update_corrections(vec![Correction::new(2, 3, "Agreement")])
        .unwrap();
    let t0 = Instant::now();
    hover(&mut overlay, 30.0, 10.0, t0);

    // Crossing into the popup cancels the pending hide.
    overlay.handle_event(OverlayEvent::PointerLeave, t0).unwrap();
    assert!(!overlay.labels().is_highlighted(0));
    assert!(overlay.handle_event(OverlayEvent::PopupPointerEnter, t0 + ms(20)).unwrap().was_handled());
    assert!(!overlay.poll(t0 + ms(100)).popup_hidden);
    assert!(overlay.popup().is_visible());

    overlay
        .handle_event(OverlayEvent::PopupPointerLeave, t0 + ms(200))
        .unwrap();
    assert!(!overlay.poll(t0 + ms(249)).popup_hidden);
    assert!(overlay.poll(t0 + ms(250)).popup_hidden);
    assert!(!overlay.popup().is_visible());
}

#[test]
fn test_replacement_removes_only_its_label() {
    let mut overlay = overlay(300.0, "I has a pen");
    let busy = record(&overlay.busy_changed);
    let corrected = record(&overlay.corrected);

    overlay
        .update_corrections(vec![
            Correction::new(2, 3, "Agreement").with_replacement("have"),
            Correction::new(8, 3, "Did you mean pan?").with_replacement("pan"),
        ])
        .unwrap();
    assert!(!overlay.is_busy());

    let now = Instant::now();
    hover(&mut overlay, 30.0, 10.0, now);
    overlay
        .handle_event(OverlayEvent::ApplyReplacement { index: 0 }, now)
        .unwrap();

    assert_eq!(overlay.text(), "I have a pen");
    assert_eq!(overlay.labels().len(), 1);
    assert_eq!(overlay.labels().marker_count(), 1);
    assert_eq!(overlay.corrections().len(), 1);
    assert_eq!(overlay.corrections()[0].offset, 8);
    assert!(!overlay.popup().is_visible());
    assert_eq!(*busy.lock(), vec![true]);

    let applied: Vec<CorrectionApplied> = corrected.lock().clone();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].replacement, "have");
    assert_eq!(applied[0].text, "I have a pen");
    assert_eq!(applied[0].revision, overlay.revision());

    // The follow-up lint clears the busy state.
    let request = overlay.request_lint_now();
    assert_eq!(request.text, "I have a pen");
    let outcome = overlay.complete_lint(request.ticket, Ok(Vec::new())).unwrap();
    assert_eq!(outcome, LintOutcome::Applied { labels: 0 });
    assert_eq!(*busy.lock(), vec![true, false]);
}

#[test]
fn test_replacement_on_outdated_batch_is_rejected() {
    let mut overlay = overlay(300.0, "I has a pen");
    overlay
        .update_corrections(vec![Correction::new(2, 3, "Agreement").with_replacement("have")])
        .unwrap();
    let now = Instant::now();
    hover(&mut overlay, 30.0, 10.0, now);
    overlay
        .handle_event(
            OverlayEvent::Input {
                text: "We has a pen".into(),
            },
            now,
        )
        .unwrap();

    let err = overlay
        .handle_event(OverlayEvent::ApplyReplacement { index: 0 }, now)
        .unwrap_err();
    assert!(matches!(err, OverlayError::StaleCorrection { .. }));
    assert_eq!(overlay.text(), "We has a pen");
}

#[test]
fn test_outdated_lint_result_discarded() {
    let mut overlay = overlay(300.0, "");
    let t0 = Instant::now();

    overlay
        .handle_event(
            OverlayEvent::Input {
                text: "I has a pen".into(),
            },
            t0,
        )
        .unwrap();
    let first = overlay.poll(t0 + ms(300)).lint_request.unwrap();

    overlay
        .handle_event(
            OverlayEvent::Input {
                text: "I has a big pen".into(),
            },
            t0 + ms(400),
        )
        .unwrap();
    let outcome = overlay
        .complete_lint(first.ticket, Ok(vec![Correction::new(2, 3, "Agreement")]))
        .unwrap();
    assert_eq!(outcome, LintOutcome::Discarded(LintDisposition::Outdated));
    assert!(overlay.labels().is_empty());
    assert!(overlay.is_busy());

    let second = overlay.poll(t0 + ms(700)).lint_request.unwrap();
    assert!(second.ticket > first.ticket);
    let outcome = overlay
        .complete_lint(second.ticket, Ok(vec![Correction::new(2, 3, "Agreement")]))
        .unwrap();
    assert_eq!(outcome, LintOutcome::Applied { labels: 1 });
    assert!(!overlay.is_busy());
}

#[test]
fn test_linter_failure_keeps_previous_labels() {
    let mut overlay = overlay(300.0, "I has a pen");
    let failures = record(&overlay.lint_failed);
    overlay
        .update_corrections(vec![Correction::new(2, 3, "Agreement")])
        .unwrap();

    let request = overlay.request_lint_now();
    assert!(overlay.is_busy());
    let outcome = overlay
        .complete_lint(request.ticket, Err(LintError::new("timeout")))
        .unwrap();

    assert_eq!(outcome, LintOutcome::Failed);
    assert_eq!(overlay.labels().len(), 1);
    assert!(!overlay.is_busy());
    assert_eq!(failures.lock().len(), 1);
    assert_eq!(failures.lock()[0].error.message(), "timeout");
}

#[test]
fn test_resize_resplits_after_quiet_interval() {
    let mut overlay = overlay(300.0, "Fix wrong words");
    let busy = record(&overlay.busy_changed);
    overlay
        .update_corrections(vec![Correction::new(4, 11, "Spans two lines")])
        .unwrap();
    assert_eq!(
        overlay.labels().labels()[0].rects(),
        &[Rect::new(40.0, 0.0, 110.0, 20.0)]
    );

    let t0 = Instant::now();
    hover(&mut overlay, 60.0, 10.0, t0);
    overlay
        .handle_event(OverlayEvent::Resize { snapshot: snapshot(200.0) }, t0)
        .unwrap();
    overlay
        .handle_event(OverlayEvent::Resize { snapshot: snapshot(100.0) }, t0 + ms(100))
        .unwrap();
    assert!(overlay.is_busy());

    assert!(overlay.poll(t0 + ms(599)).relayout.is_none());
    let relayout = overlay.poll(t0 + ms(600)).relayout.unwrap();
    assert_eq!(relayout.unwrap(), 1);

    assert_eq!(
        overlay.labels().labels()[0].rects(),
        &[
            Rect::new(40.0, 0.0, 60.0, 20.0),
            Rect::new(0.0, 20.0, 50.0, 20.0)
        ]
    );
    assert!(!overlay.popup().is_visible());
    assert!(!overlay.is_busy());
    assert_eq!(*busy.lock(), vec![true, false]);
}

#[test]
fn test_out_of_bounds_correction_keeps_labels() {
    let mut overlay = overlay(300.0, "I has a pen");
    overlay
        .update_corrections(vec![Correction::new(2, 3, "Agreement")])
        .unwrap();

    let err = overlay
        .update_corrections(vec![Correction::new(9, 5, "Past the end")])
        .unwrap_err();
    assert!(matches!(
        err,
        OverlayError::OffsetOutOfBounds {
            offset: 9,
            length: 5,
            text_len: 11
        }
    ));
    assert_eq!(overlay.labels().len(), 1);
    assert_eq!(overlay.corrections()[0].offset, 2);
}

#[test]
fn test_corrections_from_json_payload() {
    let json = r#"[
        {"offset": 2, "length": 3, "rule": {"description": "Agreement"},
         "replacements": [{"value": "have"}]},
        {"offset": 2, "length": 3, "rule": {"description": "Tense"},
         "replacements": [{"value": "had"}]}
    ]"#;
    let corrections = korrect::corrections_from_json(json).unwrap();

    let mut overlay = overlay(300.0, "I has a pen");
    assert_eq!(overlay.update_corrections(corrections).unwrap(), 1);
    hover(&mut overlay, 30.0, 10.0, Instant::now());
    assert_eq!(overlay.popup().rows().len(), 4);
}

#[test]
fn test_relayout_request_applies_pending_resize() {
    let mut overlay = overlay(300.0, "Fix wrong words");
    overlay
        .update_corrections(vec![Correction::new(4, 11, "Spans two lines")])
        .unwrap();

    let t0 = Instant::now();
    overlay
        .handle_event(OverlayEvent::Resize { snapshot: snapshot(100.0) }, t0)
        .unwrap();
    assert_eq!(overlay.labels().labels()[0].rects().len(), 1);

    overlay
        .handle_event(OverlayEvent::RelayoutRequested, t0 + ms(10))
        .unwrap();
    assert_eq!(overlay.labels().labels()[0].rects().len(), 2);
    assert!(!overlay.is_busy());
    assert!(overlay.poll(t0 + ms(500)).relayout.is_none());
}
