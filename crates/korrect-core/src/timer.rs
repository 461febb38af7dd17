//! Deferred tasks and trailing-edge debouncers.
//!
//! Timers here never read the wall clock themselves. Every operation takes the
//! current [`Instant`] from the caller, which keeps the overlay deterministic
//! under test and lets the host decide how it sleeps (see
//! [`DeferredTask::time_until`]).
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use korrect_core::Debouncer;
//!
//! let mut debounce = Debouncer::new("text", Duration::from_millis(300));
//! let t0 = Instant::now();
//!
//! debounce.schedule(t0, "a");
//! debounce.schedule(t0 + Duration::from_millis(100), "ab");
//!
//! // Nothing fires until a full quiet interval follows the last event.
//! assert_eq!(debounce.poll(t0 + Duration::from_millis(350)), None);
//! assert_eq!(debounce.poll(t0 + Duration::from_millis(400)), Some("ab"));
//! ```

use std::time::{Duration, Instant};

use crate::error::{Result, TimerError};
use crate::logging::targets;

/// A cancelable one-shot task that becomes due after a fixed delay.
///
/// Scheduling an already pending task resets it: the previous deadline is
/// cancelled and a new one is computed from `now`.
#[derive(Debug, Clone)]
pub struct DeferredTask {
    /// Name used in log output.
    name: &'static str,
    /// Delay between scheduling and becoming due.
    delay: Duration,
    /// When the task becomes due, if scheduled.
    deadline: Option<Instant>,
}

impl DeferredTask {
    /// Create an idle task with the given delay.
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            deadline: None,
        }
    }

    /// Name of this task.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay. Affects the next [`schedule`](Self::schedule) only.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Cancel any pending deadline, then schedule a new one at `now + delay`.
    pub fn schedule(&mut self, now: Instant) {
        let deadline = now + self.delay;
        if self.deadline.is_some() {
            tracing::trace!(target: targets::TIMER, name = self.name, "timer reset");
        }
        self.deadline = Some(deadline);
    }

    /// Cancel the pending deadline.
    ///
    /// Returns `true` if something was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.deadline.take().is_some();
        if was_pending {
            tracing::trace!(target: targets::TIMER, name = self.name, "timer cancelled");
        }
        was_pending
    }

    /// Whether a deadline is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the task is due.
    ///
    /// Returns `Duration::ZERO` for an overdue task and `None` when idle.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consume the deadline if it has been reached.
    ///
    /// Returns `true` exactly once per scheduled deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                tracing::trace!(target: targets::TIMER, name = self.name, "timer fired");
                true
            }
            _ => false,
        }
    }
}

/// A trailing-edge debouncer carrying the payload of the most recent event.
///
/// Every [`schedule`](Self::schedule) replaces the payload and resets the
/// deadline, so only an event followed by a full quiet interval produces
/// output. This is debouncing, not throttling.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    task: DeferredTask,
    payload: Option<T>,
    /// Number of times a pending deadline was pushed back.
    resets: u64,
}

impl<T> Debouncer<T> {
    /// Create an idle debouncer with the given quiet interval.
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            task: DeferredTask::new(name, interval),
            payload: None,
            resets: 0,
        }
    }

    /// The quiet interval.
    pub fn interval(&self) -> Duration {
        self.task.delay()
    }

    /// Change the quiet interval for subsequent events.
    pub fn set_interval(&mut self, interval: Duration) {
        self.task.set_delay(interval);
    }

    /// Record an event: replace the payload and restart the quiet interval.
    pub fn schedule(&mut self, now: Instant, payload: T) {
        if self.task.is_pending() {
            self.resets += 1;
        }
        self.task.schedule(now);
        self.payload = Some(payload);
    }

    /// Return the payload if the quiet interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.task.fire_if_due(now) {
            self.payload.take()
        } else {
            None
        }
    }

    /// Fire immediately, ignoring the remaining interval.
    pub fn flush(&mut self) -> Result<T> {
        self.task.cancel();
        self.payload.take().ok_or(TimerError::NotPending {
            name: self.task.name(),
        })
    }

    /// Drop the pending payload without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.task.cancel();
        self.payload.take()
    }

    /// Whether an event is waiting for its quiet interval.
    pub fn is_pending(&self) -> bool {
        self.task.is_pending()
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.task.deadline()
    }

    /// Time left until the pending event fires.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.task.time_until(now)
    }

    /// How many times a pending deadline has been pushed back.
    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}
