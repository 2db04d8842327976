//! Testing utilities for Trellis.
//!
//! Provides deterministic page fetchers ([`FetchScript`],
//! [`PendingFetcher`]) and a [`GridRobot`] driver that simulates a host
//! container (viewport, clock, scroll events) so integration tests
//! can exercise the grid exactly the way an embedding would.

mod fetchers;
mod robot;

pub use fetchers::*;
pub use robot::*;
