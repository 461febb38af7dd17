//! Drives an overlay without a window: simulated typing, a fake linter on
//! tokio, a hover and a replacement.
//!
//! Run with:
//!
//! ```text
//! RUST_LOG=korrect=debug cargo run -p korrect --example headless_overlay --features tokio
//! ```

use std::time::{Duration, Instant};

use korrect::prelude::*;
use korrect::runtime::LintDriver;
use tracing_subscriber::EnvFilter;

/// Flags every "has" after "I" and every doubled word.
async fn toy_linter(text: String) -> Result<Vec<Correction>, LintError> {
    tokio::time::sleep(Duration::from_millis(40)).await;

    let words: Vec<(usize, &str)> = text
        .split(' ')
        .scan(0usize, |offset, word| {
            let start = *offset;
            *offset += word.chars().count() + 1;
            Some((start, word))
        })
        .collect();

    let mut corrections = Vec::new();
    for pair in words.windows(2) {
        let [(_, prev), (offset, word)] = pair else {
            continue;
        };
        let length = word.chars().count();
        if *prev == "I" && *word == "has" {
            corrections.push(
                Correction::new(*offset, length, "Agreement\nUse \"have\" after \"I\".")
                    .with_replacement("have"),
            );
        } else if prev.eq_ignore_ascii_case(word) {
            corrections.push(
                Correction::new(*offset - 1, length + 1, "Repeated word").with_replacement(""),
            );
        }
    }
    Ok(corrections)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = OverlayConfig::default().with_text_debounce(Duration::from_millis(100));
    let style = MirrorStyle::new(120.0, 80.0).with_line_height(20.0);
    let mut overlay = OverlayWidget::new(
        GridLayoutHost::with_advance(10.0),
        SurfaceSnapshot::new(style, SurfaceGeometry::new(Point::new(40.0, 40.0))),
        config,
    );
    let mut driver = LintDriver::new(toy_linter, tokio::runtime::Handle::current());

    overlay.busy_changed.connect(|busy| println!("busy: {busy}"));
    overlay
        .corrected
        .connect(|applied| println!("corrected to {:?}", applied.text));

    let mut typed = String::new();
    for ch in "I has the the pen".chars() {
        typed.push(ch);
        let now = Instant::now();
        overlay.handle_event(OverlayEvent::KeyDown, now)?;
        overlay.handle_event(OverlayEvent::Input { text: typed.clone() }, now)?;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for outcome in driver.run_until_idle(&mut overlay).await {
        println!("lint outcome: {:?}", outcome?);
    }

    for label in overlay.labels().labels() {
        println!(
            "{:?} at {:?}",
            label.correction().rule.description.lines().next(),
            label.rects()
        );
    }

    // Hover the first marker, in client coordinates.
    let Some(first) = overlay.labels().labels().first() else {
        println!("no corrections");
        return Ok(());
    };
    let target = overlay.geometry().to_client(first.rects()[0].center());
    overlay.handle_event(OverlayEvent::PointerMove { position: target }, Instant::now())?;
    println!("popup rows: {:?}", overlay.popup().rows());
    println!("popup bounds: {:?}", overlay.popup_bounds()?);

    overlay.handle_event(OverlayEvent::ApplyReplacement { index: 0 }, Instant::now())?;
    driver.submit(overlay.request_lint_now());
    for outcome in driver.run_until_idle(&mut overlay).await {
        println!("lint outcome: {:?}", outcome?);
    }
    println!("final text: {:?}, labels: {}", overlay.text(), overlay.labels().len());

    Ok(())
}
