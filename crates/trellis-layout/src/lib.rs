//! Grid geometry & viewport windowing for Trellis.
//!
//! This crate is pure math: it translates (container size, item count,
//! scroll offset, sizing constraints) into a [`LayoutFrame`] describing
//! the responsive column layout, the reserved virtual scroll height, and
//! the index window that must be mounted to cover the visible viewport.
//!
//! It holds no state and performs no I/O. A widget layer is expected to
//! provide:
//! - the measured container size (width/height)
//! - the tracked scroll offset
//! - the current item count (fetched items plus any placeholder slots)

mod columns;
mod frame;

pub use columns::*;
pub use frame::*;
