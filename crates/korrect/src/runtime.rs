//! Tokio integration for running the external linter.
//!
//! The overlay itself is synchronous and never awaits anything. A
//! [`LintDriver`] spawns lint calls onto a tokio runtime and hands their
//! results back to the overlay on the host's thread.
//!
//! # Feature Flag
//!
//! This module requires the `tokio` feature:
//!
//! ```toml
//! [dependencies]
//! korrect = { version = "0.1", features = ["tokio"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use korrect::runtime::LintDriver;
//! use korrect::{Correction, LintError};
//!
//! # async fn run() {
//! let mut driver = LintDriver::new(
//!     |text: String| async move {
//!         let corrections: Result<Vec<Correction>, LintError> = Ok(Vec::new());
//!         let _ = text;
//!         corrections
//!     },
//!     tokio::runtime::Handle::current(),
//! );
//! # let _ = &mut driver;
//! # }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use korrect_core::logging::targets;
use korrect_render::text::LayoutHost;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::correction::Correction;
use crate::error::{LintError, OverlayResult};
use crate::overlay::{LintOutcome, OverlayWidget, PollOutcome};
use crate::pipeline::{LintRequest, LintTicket};

/// An external linter: text in, corrections out.
///
/// Implemented for any `Fn(String) -> impl Future` closure.
pub trait Linter: Send + Sync + 'static {
    fn lint(&self, text: String) -> BoxFuture<'static, Result<Vec<Correction>, LintError>>;
}

impl<F, Fut> Linter for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Correction>, LintError>> + Send + 'static,
{
    fn lint(&self, text: String) -> BoxFuture<'static, Result<Vec<Correction>, LintError>> {
        (self)(text).boxed()
    }
}

/// A finished lint call.
#[derive(Debug)]
pub struct LintCompletion {
    pub ticket: LintTicket,
    pub result: Result<Vec<Correction>, LintError>,
}

/// Runs lint requests on a tokio runtime.
///
/// Calls are never cancelled; the overlay discards answers that were
/// superseded while they ran.
pub struct LintDriver {
    linter: Arc<dyn Linter>,
    handle: Handle,
    tx: mpsc::UnboundedSender<LintCompletion>,
    rx: mpsc::UnboundedReceiver<LintCompletion>,
    in_flight: usize,
}

impl LintDriver {
    pub fn new(linter: impl Linter, handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            linter: Arc::new(linter),
            handle,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start a lint call for `request`.
    pub fn submit(&mut self, request: LintRequest) {
        let LintRequest { ticket, text, .. } = request;
        let linter = Arc::clone(&self.linter);
        let tx = self.tx.clone();

        self.in_flight += 1;
        self.handle.spawn(async move {
            let result = match AssertUnwindSafe(linter.lint(text)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(
                        target: targets::PIPELINE,
                        ticket = ticket.sequence(),
                        "linter panicked"
                    );
                    Err(LintError::new("linter panicked"))
                }
            };
            // The driver may have been dropped; nobody is waiting then.
            let _ = tx.send(LintCompletion { ticket, result });
        });
    }

    /// Hand every finished call to `overlay`, without waiting.
    pub fn drain<H: LayoutHost>(
        &mut self,
        overlay: &mut OverlayWidget<H>,
    ) -> Vec<OverlayResult<LintOutcome>> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            outcomes.push(overlay.complete_lint(completion.ticket, completion.result));
        }
        outcomes
    }

    /// Wait for the next finished call.
    pub async fn next_completion(&mut self) -> Option<LintCompletion> {
        let completion = self.rx.recv().await;
        if completion.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        completion
    }

    /// Poll the overlay's timers, submit any lint request they produce, and
    /// deliver finished calls.
    pub fn pump<H: LayoutHost>(
        &mut self,
        overlay: &mut OverlayWidget<H>,
        now: Instant,
    ) -> (PollOutcome, Vec<OverlayResult<LintOutcome>>) {
        let poll = overlay.poll(now);
        if let Some(request) = &poll.lint_request {
            self.submit(request.clone());
        }
        let outcomes = self.drain(overlay);
        (poll, outcomes)
    }

    /// Drive `overlay` until no timer is pending and no call is running.
    ///
    /// Returns the outcome of every completion delivered on the way.
    pub async fn run_until_idle<H: LayoutHost>(
        &mut self,
        overlay: &mut OverlayWidget<H>,
    ) -> Vec<OverlayResult<LintOutcome>> {
        let mut outcomes = Vec::new();
        loop {
            let (_, delivered) = self.pump(overlay, Instant::now());
            outcomes.extend(delivered);

            let deadline = overlay.next_deadline();
            if deadline.is_none() && self.in_flight == 0 {
                return outcomes;
            }

            let sleep = async {
                match deadline {
                    Some(deadline) => {
                        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                () = sleep => {}
                Some(completion) = self.next_completion() => {
                    outcomes.push(overlay.complete_lint(completion.ticket, completion.result));
                }
            }
        }
    }

    /// Number of calls started and not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl std::fmt::Debug for LintDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LintDriver")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::OverlayConfig;
    use crate::events::{OverlayEvent, SurfaceGeometry, SurfaceSnapshot};
    use crate::pipeline::LintDisposition;
    use korrect_render::MirrorStyle;
    use korrect_render::text::GridLayoutHost;

    fn overlay() -> OverlayWidget<GridLayoutHost> {
        let config = OverlayConfig::default()
            .with_text_debounce(Duration::from_millis(10))
            .with_resize_debounce(Duration::from_millis(10));
        OverlayWidget::new(
            GridLayoutHost::with_advance(10.0),
            SurfaceSnapshot::new(
                MirrorStyle::new(300.0, 100.0).with_line_height(20.0),
                SurfaceGeometry::default(),
            ),
            config,
        )
    }

    fn has_linter(text: String) -> impl Future<Output = Result<Vec<Correction>, LintError>> {
        async move {
            Ok(text
                .find("has")
                .map(|at| {
                    let offset = text[..at].chars().count();
                    Correction::new(offset, 3, "Agreement").with_replacement("have")
                })
                .into_iter()
                .collect())
        }
    }

    #[tokio::test]
    async fn test_typing_produces_labels() {
        let mut overlay = overlay();
        let mut driver = LintDriver::new(has_linter, Handle::current());

        overlay
            .handle_event(
                OverlayEvent::Input {
                    text: "I has a pen".into(),
                },
                Instant::now(),
            )
            .unwrap();
        let outcomes = driver.run_until_idle(&mut overlay).await;

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0],
            Ok(LintOutcome::Applied { labels: 1 })
        ));
        assert_eq!(driver.in_flight(), 0);
        assert!(!overlay.is_busy());
    }

    #[tokio::test]
    async fn test_slow_stale_answer_discarded() {
        let mut overlay = overlay().with_text("I has a pen");
        let mut driver = LintDriver::new(
            |text: String| async move {
                if text.contains("pen") {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                has_linter(text).await
            },
            Handle::current(),
        );

        let slow = overlay.request_lint_now();
        driver.submit(slow);
        overlay.set_text("She has a cat");
        let fast = overlay.request_lint_now();
        driver.submit(fast);

        let outcomes = driver.run_until_idle(&mut overlay).await;
        let outcomes: Vec<_> = outcomes.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            outcomes,
            vec![
                LintOutcome::Applied { labels: 1 },
                LintOutcome::Discarded(LintDisposition::Superseded),
            ]
        );
        assert_eq!(overlay.corrections()[0].offset, 4);
    }

    #[tokio::test]
    async fn test_panicking_linter_reported_as_failure() {
        let mut overlay = overlay().with_text("boom");
        let mut driver = LintDriver::new(
            |_text: String| async move {
                if true {
                    panic!("linter bug");
                }
                Ok::<_, LintError>(Vec::<Correction>::new())
            },
            Handle::current(),
        );

        driver.submit(overlay.request_lint_now());
        let outcomes = driver.run_until_idle(&mut overlay).await;
        assert!(matches!(outcomes[0], Ok(LintOutcome::Failed)));
        assert!(!overlay.is_busy());
    }
}
