//! Responsive virtualized infinite-scroll grid.
//!
//! The widget layer of Trellis: [`GridState`] composes the page cache
//! from `trellis-core` with the window measurement from
//! `trellis-layout` and drives both from rate-limited scroll events.
//!
//! The crate is renderer-agnostic. A host embeds it by:
//! 1. creating a [`GridState`] with a [`GridSpec`],
//! 2. installing a query with [`GridState::set_query`],
//! 3. forwarding container scroll/resize measurements via
//!    [`GridState::notify_scroll`] / [`GridState::notify_resized`],
//! 4. calling [`GridState::tick`] from its event loop to drive the
//!    fetch future and the trailing throttle run,
//! 5. producing its frame from [`GridState::render_pass`], which maps
//!    only the mounted index window through the caller's per-item
//!    renderer and describes everything else as reserved height.
//!
//! Hosts that want to re-render reactively register a callback with
//! [`GridState::observe`]; the returned registration detaches on drop,
//! on every exit path.

mod render;
mod spec;
mod state;
mod throttle;

pub use render::*;
pub use spec::*;
pub use state::*;
pub use throttle::*;

pub use trellis_core::{
    FetchError, ItemSequence, LoadError, PageFetcher, PageFuture, PageRequest, PollOutcome,
    QueryIdentity,
};
pub use trellis_layout::{CellRect, GridMeasureConfig, LayoutFrame};
