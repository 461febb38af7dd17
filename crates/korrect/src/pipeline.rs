//! Update Pipeline: debounced lint requests and resize reconciliation.
//!
//! Two independent trailing-edge debouncers feed the overlay:
//!
//! - **text**: key-down and input events. When it fires, a [`LintRequest`]
//!   is issued for the current text.
//! - **resize**: surface geometry changes. When it fires, the mirror style is
//!   re-derived and the current corrections are split again, without linting.
//!
//! Every request carries a monotonically increasing [`LintTicket`] and the
//! text revision it was issued for. Lint calls are never cancelled once
//! started, so completions can arrive out of order; only the completion for
//! the most recent ticket, still matching the current text, is applied.

use std::time::{Duration, Instant};

use korrect_core::Debouncer;
use korrect_core::logging::targets;

use crate::events::SurfaceSnapshot;

/// Sequence number of a lint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LintTicket(u64);

impl LintTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// A request for the external linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRequest {
    pub ticket: LintTicket,
    /// Text revision the request was issued for.
    pub revision: u64,
    pub text: String,
}

/// What to do with a lint completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintDisposition {
    /// Latest request, text unchanged: apply it.
    Current,
    /// A newer request was issued after this one.
    Superseded,
    /// The text changed while the lint was running.
    Outdated,
}

/// Debounce timers, request sequencing and busy bookkeeping.
#[derive(Debug)]
pub struct UpdatePipeline {
    text: Debouncer<()>,
    resize: Debouncer<SurfaceSnapshot>,
    issued: u64,
    /// Latest issued request still awaiting completion.
    in_flight: Option<(LintTicket, u64)>,
    awaiting_lint: bool,
    /// A replacement changed the text; busy until the next current lint.
    awaiting_followup: bool,
    relayout_pending: bool,
}

impl UpdatePipeline {
    pub fn new(text_interval: Duration, resize_interval: Duration) -> Self {
        Self {
            text: Debouncer::new("text_change", text_interval),
            resize: Debouncer::new("resize", resize_interval),
            issued: 0,
            in_flight: None,
            awaiting_lint: false,
            awaiting_followup: false,
            relayout_pending: false,
        }
    }

    pub fn set_intervals(&mut self, text: Duration, resize: Duration) {
        self.text.set_interval(text);
        self.resize.set_interval(resize);
    }

    /// Record a key-down or input event.
    pub fn text_changed(&mut self, now: Instant) {
        self.text.schedule(now, ());
        self.awaiting_lint = true;
    }

    /// Record a geometry change of the surface.
    pub fn resized(&mut self, now: Instant, snapshot: SurfaceSnapshot) {
        self.resize.schedule(now, snapshot);
        self.relayout_pending = true;
    }

    /// Whether the text quiet interval has elapsed.
    pub fn poll_text(&mut self, now: Instant) -> bool {
        let fired = self.text.poll(now).is_some();
        if fired {
            tracing::debug!(
                target: targets::PIPELINE,
                resets = self.text.reset_count(),
                "text debounce fired"
            );
        }
        fired
    }

    /// The latest surface snapshot once the resize quiet interval has elapsed.
    pub fn poll_resize(&mut self, now: Instant) -> Option<SurfaceSnapshot> {
        let snapshot = self.resize.poll(now);
        if snapshot.is_some() {
            tracing::debug!(target: targets::PIPELINE, "resize debounce fired");
        }
        snapshot
    }

    /// Take a pending resize snapshot without waiting for the quiet interval.
    pub fn flush_resize(&mut self) -> Option<SurfaceSnapshot> {
        match self.resize.flush() {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::trace!(target: targets::PIPELINE, %err, "no resize to flush");
                None
            }
        }
    }

    /// Drop a pending text debounce. Returns `true` if one was pending.
    pub fn cancel_text(&mut self) -> bool {
        self.text.cancel().is_some()
    }

    /// Issue a request for `text` at `revision`, superseding earlier ones.
    pub fn issue(&mut self, text: String, revision: u64) -> LintRequest {
        self.issued += 1;
        let ticket = LintTicket(self.issued);
        self.in_flight = Some((ticket, revision));
        self.awaiting_lint = true;
        tracing::debug!(
            target: targets::PIPELINE,
            ticket = ticket.0,
            revision,
            "lint requested"
        );
        LintRequest {
            ticket,
            revision,
            text,
        }
    }

    /// Classify a completion against the latest request and current text.
    ///
    /// A current or outdated completion retires the in-flight request and
    /// stays busy only while a text debounce is pending. A replacement keeps
    /// the overlay busy until a current completion arrives.
    pub fn resolve(&mut self, ticket: LintTicket, current_revision: u64) -> LintDisposition {
        let disposition = match self.in_flight {
            Some((latest, _)) if latest != ticket => LintDisposition::Superseded,
            None => LintDisposition::Superseded,
            Some((_, revision)) if revision != current_revision => LintDisposition::Outdated,
            Some(_) => LintDisposition::Current,
        };

        match disposition {
            LintDisposition::Current => {
                self.in_flight = None;
                self.awaiting_lint = self.text.is_pending();
                self.awaiting_followup = false;
            }
            LintDisposition::Outdated => {
                self.in_flight = None;
                self.awaiting_lint = self.text.is_pending();
            }
            LintDisposition::Superseded => {}
        }

        if disposition != LintDisposition::Current {
            tracing::debug!(
                target: targets::PIPELINE,
                ticket = ticket.0,
                ?disposition,
                "stale lint result discarded"
            );
        }
        disposition
    }

    /// Record corrections delivered outside the ticketed path.
    ///
    /// The overlay stays busy while a text event or a request is outstanding.
    pub fn settle(&mut self) {
        self.awaiting_lint = self.text.is_pending() || self.in_flight.is_some();
        self.awaiting_followup = false;
    }

    /// Mark the overlay busy until the next lint completes.
    pub fn expect_lint(&mut self) {
        self.awaiting_followup = true;
    }

    /// Record that the relayout for the last resize finished.
    pub fn relayout_done(&mut self) {
        self.relayout_pending = self.resize.is_pending();
    }

    pub fn is_busy(&self) -> bool {
        self.awaiting_lint || self.awaiting_followup || self.relayout_pending
    }

    pub fn latest_ticket(&self) -> Option<LintTicket> {
        self.in_flight.map(|(ticket, _)| ticket)
    }

    pub fn is_text_pending(&self) -> bool {
        self.text.is_pending()
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Earliest pending debounce deadline.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.text.deadline(), self.resize.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
