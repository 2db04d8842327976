//! Timer-gated scroll throttle.
//!
//! Scroll events arrive much faster than the grid needs to recompute.
//! The gate admits at most one recomputation per interval: the first
//! event in a window runs immediately, later events inside the window
//! are coalesced into a single trailing run carrying the most recent
//! position, so the terminal event is never dropped.

use std::time::Duration;
use web_time::Instant;

/// Rate limiter for scroll-driven recomputation.
///
/// Driven with explicit instants so hosts and tests control time.
#[derive(Debug)]
pub struct ScrollThrottle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: Option<f32>,
}

impl ScrollThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: None,
        }
    }

    /// Offers a new scroll position.
    ///
    /// Returns `Some(position)` when the caller should recompute now
    /// (leading edge); `None` when the event was coalesced into the
    /// pending trailing run.
    pub fn offer(&mut self, position: f32, now: Instant) -> Option<f32> {
        let gate_open = match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if gate_open {
            self.last_run = Some(now);
            self.pending = None;
            Some(position)
        } else {
            self.pending = Some(position);
            None
        }
    }

    /// Takes the pending trailing position once the window has elapsed.
    ///
    /// Called periodically (each host tick); returns the most recent
    /// coalesced position when it is due, `None` otherwise.
    pub fn take_due(&mut self, now: Instant) -> Option<f32> {
        self.pending?;
        let due = match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_run = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Whether a trailing run is waiting for the window to elapse.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forgets all gating state, e.g. when the query restarts.
    pub fn reset(&mut self) {
        self.last_run = None;
        self.pending = None;
    }
}
