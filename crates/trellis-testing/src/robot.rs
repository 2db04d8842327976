//! Host-container simulator for driving a grid in tests.

use std::cell::Cell;
use std::time::Duration;

use web_time::Instant;

use trellis_core::{PageFetcher, PollOutcome, QueryIdentity};
use trellis_grid::{GridSpec, GridState, GridSurface, ReadySurface, TickSummary};

/// Drives a [`GridState`] the way an embedding host would: it owns the
/// simulated viewport and clock, forwards scroll events, and ticks the
/// event loop.
///
/// Time only moves when the test says so, which makes throttle windows
/// and in-flight fetches fully deterministic.
pub struct GridRobot<T> {
    state: GridState<T>,
    now: Cell<Instant>,
}

impl<T: 'static> GridRobot<T> {
    /// Creates a robot with the given spec and container size.
    pub fn new(spec: GridSpec, width: f32, height: f32) -> Self {
        let state = GridState::new(spec);
        state.notify_resized(width, height);
        Self {
            state,
            now: Cell::new(Instant::now()),
        }
    }

    /// The grid state under test.
    pub fn state(&self) -> &GridState<T> {
        &self.state
    }

    /// Installs a query, which also kicks off the initial fetch.
    pub fn set_query(&self, identity: QueryIdentity, fetcher: PageFetcher<T>) -> bool {
        self.state.set_query(identity, fetcher)
    }

    /// Reports a scroll event at the current simulated time.
    pub fn scroll_to(&self, position: f32) {
        self.state.notify_scroll(position, self.now.get());
    }

    /// Resizes the simulated container.
    pub fn resize(&self, width: f32, height: f32) {
        self.state.notify_resized(width, height);
    }

    /// Advances the clock and runs one event-loop tick.
    pub fn advance(&self, millis: u64) -> TickSummary {
        let now = self.now.get() + Duration::from_millis(millis);
        self.now.set(now);
        self.state.tick(now)
    }

    /// Ticks (in 250ms steps) until the grid goes quiet: no in-flight
    /// fetch, no pending trailing scroll, nothing newly started.
    ///
    /// Panics when the grid keeps churning, usually an accidental
    /// fetch loop.
    pub fn settle(&self) {
        for _ in 0..64 {
            let summary = self.advance(250);
            let quiet = summary.fetch == PollOutcome::Idle
                && !summary.applied_trailing_scroll
                && !summary.started_fetch
                && !self.state.is_fetching();
            if quiet {
                return;
            }
        }
        panic!("grid did not settle within 64 ticks");
    }

    /// Renders the current frame through `render_item`.
    pub fn surface<N>(&self, render_item: impl FnMut(&T, usize) -> N) -> GridSurface<N> {
        self.state.render_pass(render_item)
    }
}

/// Unwraps a [`GridSurface::Ready`], panicking with context otherwise.
pub fn expect_ready<N: std::fmt::Debug>(surface: GridSurface<N>) -> ReadySurface<N> {
    match surface {
        GridSurface::Ready(ready) => ready,
        other => panic!("expected Ready surface, got {other:?}"),
    }
}

/// The indices of every mounted cell, in order.
pub fn mounted_indices<N>(ready: &ReadySurface<N>) -> Vec<usize> {
    ready.cells.iter().map(|cell| cell.index).collect()
}

/// Number of mounted skeleton slots.
pub fn mounted_skeletons<N>(ready: &ReadySurface<N>) -> usize {
    ready
        .cells
        .iter()
        .filter(|cell| cell.slot.is_skeleton())
        .count()
}
